//! Configuration loading from the process environment.

use crate::config::schema::GatewayConfig;

/// Build a [`GatewayConfig`] from environment variables, falling back to
/// defaults for anything unset or unparseable. Secrets intentionally default
/// to empty strings so validation can refuse them.
pub fn from_env() -> GatewayConfig {
    let defaults = GatewayConfig::default();
    GatewayConfig {
        username: env_str("AUTH_USERNAME", defaults.username),
        password: env_str("AUTH_PASSWORD", defaults.password),
        port: env_parsed("SERVER_PORT", defaults.port),
        upstream_url: env_str("TTYD_URL", defaults.upstream_url),
        session_secret: env_str("SESSION_SECRET", defaults.session_secret),
        session_name: env_str("SESSION_NAME", defaults.session_name),
        secure_cookie: env_bool("SECURE_COOKIE", defaults.secure_cookie),
        http_only: env_bool("HTTP_ONLY", defaults.http_only),
        environment: env_str("ENV", defaults.environment),
        max_login_attempts: env_parsed("MAX_LOGIN_ATTEMPTS", defaults.max_login_attempts),
        session_timeout_mins: env_parsed("SESSION_TIMEOUT", defaults.session_timeout_mins),
        allowed_ips: parse_ip_list(&env_str("ALLOWED_IPS", String::new())),
        trust_proxy: env_bool("TRUST_PROXY", defaults.trust_proxy),
        request_timeout_secs: env_parsed("REQUEST_TIMEOUT", defaults.request_timeout_secs),
    }
}

fn env_str(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default,
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_bool(&v))
        .unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Case-insensitive boolean parsing: `true|1|yes|on` / `false|0|no|off`.
/// Anything else is `None` so the caller's default applies.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated prefix list, trimming entries and dropping blanks.
pub(crate) fn parse_ip_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
