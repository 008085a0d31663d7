//! Configuration schema.

/// Gateway configuration, populated from the process environment.
///
/// See [`crate::config::loader`] for the variable names and
/// [`crate::config::validation`] for the startup checks.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Username of the single configured account (`AUTH_USERNAME`).
    pub username: String,

    /// Password of the single configured account (`AUTH_PASSWORD`).
    /// No safe default — validation fails startup when unset or weak.
    pub password: String,

    /// Listen port (`SERVER_PORT`).
    pub port: u16,

    /// Upstream terminal service URL (`TTYD_URL`).
    pub upstream_url: String,

    /// Session sealing secret (`SESSION_SECRET`).
    /// No safe default — validation fails startup when unset or weak.
    pub session_secret: String,

    /// Session cookie name (`SESSION_NAME`).
    pub session_name: String,

    /// Mark the session cookie `Secure` (`SECURE_COOKIE`).
    pub secure_cookie: bool,

    /// Mark the session cookie `HttpOnly` (`HTTP_ONLY`).
    pub http_only: bool,

    /// Environment tag (`ENV`); `production` enables HSTS.
    pub environment: String,

    /// Failed-login budget per client address (`MAX_LOGIN_ATTEMPTS`).
    pub max_login_attempts: u32,

    /// Session idle timeout in minutes (`SESSION_TIMEOUT`).
    pub session_timeout_mins: u64,

    /// Allowed client-address prefixes (`ALLOWED_IPS`); empty = allow all.
    pub allowed_ips: Vec<String>,

    /// Trust the leftmost `X-Forwarded-For` entry as the client address
    /// (`TRUST_PROXY`). Off by default; enable only behind a trusted proxy.
    pub trust_proxy: bool,

    /// Bound on producing upstream response headers, in seconds
    /// (`REQUEST_TIMEOUT`). Does not limit streaming or spliced bodies.
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: String::new(),
            port: 3000,
            upstream_url: "http://localhost:7681".to_string(),
            session_secret: String::new(),
            session_name: "terminal_session".to_string(),
            secure_cookie: false,
            http_only: true,
            environment: "development".to_string(),
            max_login_attempts: 5,
            session_timeout_mins: 30,
            allowed_ips: Vec::new(),
            trust_proxy: false,
            request_timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    /// Session idle timeout in seconds; also the cookie `Max-Age`.
    pub fn session_timeout_secs(&self) -> u64 {
        self.session_timeout_mins * 60
    }
}
