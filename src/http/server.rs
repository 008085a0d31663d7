//! HTTP server setup and filter-chain composition.
//!
//! # Responsibilities
//! - Build the Axum router: public routes, protected proxy routes
//! - Order the filter chain (security headers outermost, then the
//!   allow-list, then tracing/timeout, then per-route auth filters)
//! - Run the server with graceful shutdown and the attempt sweeper

use axum::{
    body::Body,
    middleware,
    routing::{any, get},
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigError, GatewayConfig};
use crate::http::handlers::{handle_login, handle_logout, health, login_page, root_redirect};
use crate::http::middleware::{auth_gate_middleware, idle_timeout_middleware};
use crate::lifecycle::Shutdown;
use crate::proxy::{proxy_handler, UpstreamTarget, PROTECTED_PREFIX};
use crate::security::allow_list::allow_list_middleware;
use crate::security::attempts::AttemptLimiter;
use crate::security::headers::security_headers_middleware;
use crate::session::SessionStore;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub sessions: SessionStore,
    pub attempts: Arc<AttemptLimiter>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<UpstreamTarget>,
    pub started_at: Instant,
}

/// The authenticating gateway server.
pub struct HttpServer {
    router: Router,
    attempts: Arc<AttemptLimiter>,
}

impl HttpServer {
    /// Wire up state and routes from a validated configuration. The upstream
    /// URL is parsed here; failure is fatal to startup.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let upstream = UpstreamTarget::parse(&config.upstream_url)
            .map_err(ConfigError::InvalidUpstream)?;

        let sessions = SessionStore::new(
            &config.session_secret,
            &config.session_name,
            config.http_only,
            config.secure_cookie,
            config.session_timeout_secs(),
        );
        let attempts = Arc::new(AttemptLimiter::new(config.max_login_attempts));
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            config: Arc::new(config),
            sessions,
            attempts: attempts.clone(),
            client,
            upstream: Arc::new(upstream),
            started_at: Instant::now(),
        };

        let router = Self::build_router(state);
        Ok(Self { router, attempts })
    }

    /// Build the router with the full filter chain.
    fn build_router(state: AppState) -> Router {
        // Requests under the protected prefix pass the auth gate first,
        // then the idle-timeout check, then reach the proxy.
        let protected = Router::new()
            .route(PROTECTED_PREFIX, any(proxy_handler))
            .route(&format!("{PROTECTED_PREFIX}/"), any(proxy_handler))
            .route(&format!("{PROTECTED_PREFIX}/{{*path}}"), any(proxy_handler))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                idle_timeout_middleware,
            ))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_gate_middleware,
            ));

        let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

        Router::new()
            .route("/login", get(login_page).post(handle_login))
            .route("/logout", get(handle_logout))
            .route("/health", get(health))
            .route("/", get(root_redirect))
            .merge(protected)
            .with_state(state.clone())
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn_with_state(
                state.clone(),
                allow_list_middleware,
            ))
            // Outermost: even 403s and redirects carry the security headers.
            .layer(middleware::from_fn_with_state(
                state,
                security_headers_middleware,
            ))
    }

    /// Run the server until shutdown is triggered. Also owns the attempt
    /// sweeper's lifetime.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        tokio::spawn(self.attempts.clone().sweep_loop(shutdown.subscribe()));

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let signal = {
            let shutdown = shutdown.clone();
            async move { shutdown.triggered().await }
        };
        axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
