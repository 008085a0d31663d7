//! Login, logout, root, and health controllers.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Json, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use subtle::ConstantTimeEq;

use crate::config::GatewayConfig;
use crate::http::found;
use crate::http::server::AppState;
use crate::http::templates;
use crate::proxy::PROTECTED_PREFIX;
use crate::security::client_addr;
use crate::session::SessionData;

#[derive(Deserialize)]
pub struct LoginQuery {
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// `GET /login` — render the login page, with the error code (if any)
/// taken from the query string.
pub async fn login_page(Query(query): Query<LoginQuery>) -> Html<String> {
    templates::render_login(query.error.as_deref())
}

/// `POST /login` — throttle check, credential check, session issuance.
pub async fn handle_login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let addr = client_addr(&headers, peer, state.config.trust_proxy);

    if !state.attempts.permit(&addr) {
        tracing::warn!(addr = %addr, "Login rejected: too many attempts");
        return found("/login?error=2");
    }

    if !credentials_match(&state.config, &form.username, &form.password) {
        state.attempts.record_failure(&addr);
        tracing::warn!(user = %form.username, addr = %addr, "Failed login attempt");
        return found("/login?error=1");
    }

    state.attempts.reset(&addr);
    let session = SessionData::authenticated(&form.username, &addr);
    match state.sessions.seal(&session) {
        Ok(cookie) => {
            tracing::info!(user = %form.username, addr = %addr, "Successful login");
            (jar.add(cookie), found(&format!("{PROTECTED_PREFIX}/"))).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, addr = %addr, "Failed to save session");
            found("/login?error=1")
        }
    }
}

/// `GET /logout` — clear the session and return to the login page.
pub async fn handle_logout(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let addr = client_addr(&headers, peer, state.config.trust_proxy);
    let username = jar
        .get(state.sessions.cookie_name())
        .and_then(|cookie| state.sessions.open(cookie.value()))
        .map(|session| session.username)
        .unwrap_or_default();

    tracing::info!(user = %username, addr = %addr, "User logged out");
    (jar.add(state.sessions.removal_cookie()), found("/login")).into_response()
}

/// `GET /` — send authenticated clients to the terminal, everyone else to
/// the login page.
pub async fn root_redirect(State(state): State<AppState>, jar: CookieJar) -> Response {
    let authenticated = jar
        .get(state.sessions.cookie_name())
        .and_then(|cookie| state.sessions.open(cookie.value()))
        .map(|session| session.authenticated)
        .unwrap_or(false);

    if authenticated {
        found(&format!("{PROTECTED_PREFIX}/"))
    } else {
        found("/login")
    }
}

/// `GET /health` — unauthenticated liveness probe.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "version": "1.0.0",
    }))
}

/// Compare both credential fields in constant time so response timing does
/// not reveal which of the two was wrong.
fn credentials_match(config: &GatewayConfig, username: &str, password: &str) -> bool {
    let user_ok: bool = username
        .as_bytes()
        .ct_eq(config.username.as_bytes())
        .into();
    let pass_ok: bool = password
        .as_bytes()
        .ct_eq(config.password.as_bytes())
        .into();
    user_ok & pass_ok
}
