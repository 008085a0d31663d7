//! Configuration validation.
//!
//! Semantic checks that must hold before the gateway starts. A config that
//! fails any of them is a fatal startup error; there is no degraded mode for
//! a weak secret or an unreachable-by-construction upstream.

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::proxy::UpstreamTarget;

/// Password shipped in sample configs; never allowed at runtime.
pub const BLACKLISTED_PASSWORD: &str = "admin123";

/// Session secret shipped in sample configs; never allowed at runtime.
pub const BLACKLISTED_SECRET: &str = "secret-key-change-this";

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AUTH_PASSWORD must be set, changed from the default, and at least {MIN_PASSWORD_LEN} characters long")]
    WeakPassword,

    #[error("SESSION_SECRET must be set, changed from the default, and at least {MIN_SECRET_LEN} characters long")]
    WeakSecret,

    #[error("TTYD_URL is not a valid upstream URL: {0}")]
    InvalidUpstream(String),

    #[error("SERVER_PORT must be non-zero")]
    InvalidPort,
}

/// Validate a loaded config, returning every violation found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.password.len() < MIN_PASSWORD_LEN || config.password == BLACKLISTED_PASSWORD {
        errors.push(ConfigError::WeakPassword);
    }

    if config.session_secret.len() < MIN_SECRET_LEN || config.session_secret == BLACKLISTED_SECRET {
        errors.push(ConfigError::WeakSecret);
    }

    if let Err(reason) = UpstreamTarget::parse(&config.upstream_url) {
        errors.push(ConfigError::InvalidUpstream(reason));
    }

    if config.port == 0 {
        errors.push(ConfigError::InvalidPort);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
