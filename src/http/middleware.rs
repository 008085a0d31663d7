//! Per-route session filters for the protected prefix.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use cookie::Cookie;

use crate::http::found;
use crate::http::server::AppState;
use crate::session::{now_unix_secs, SessionData};

/// Auth gate: requests without an authenticated session are redirected to
/// the login page and the chain stops. Does not mutate the session; the
/// opened session is attached to the request for downstream filters.
pub async fn auth_gate_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = jar
        .get(state.sessions.cookie_name())
        .and_then(|cookie| state.sessions.open(cookie.value()));

    match session {
        Some(session) if session.authenticated => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        _ => found("/login"),
    }
}

/// Idle-timeout enforcement. Runs after the auth gate, so only
/// authenticated traffic touches the session. An expired session is
/// cleared and redirected; a live one gets `last_activity` refreshed and
/// the re-sealed cookie attached to the response.
pub async fn idle_timeout_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(mut session) = request.extensions().get::<SessionData>().cloned() else {
        return next.run(request).await;
    };

    let now = now_unix_secs();
    if now.saturating_sub(session.last_activity) > state.config.session_timeout_secs() {
        tracing::info!(user = %session.username, "Session timed out");
        let mut response = found("/login");
        append_set_cookie(&mut response, &state.sessions.removal_cookie());
        return response;
    }

    session.last_activity = now;
    // The rewritten cookie also resets Max-Age, but this idle check stays
    // authoritative: the semantic clock is last_activity.
    let refreshed = state.sessions.seal(&session).ok();

    let mut response = next.run(request).await;
    match refreshed {
        Some(cookie) => append_set_cookie(&mut response, &cookie),
        None => tracing::warn!(user = %session.username, "Failed to refresh session cookie"),
    }
    response
}

fn append_set_cookie(response: &mut Response, cookie: &Cookie<'_>) {
    if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
}
