//! Configuration management.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (read vars, apply defaults, parse bools/ints)
//!     → validation.rs (refuse weak secrets, bad upstream URL)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - Unparseable values fall back to defaults; *missing secrets do not* —
//!   validation fails startup instead of inventing credentials
//! - Validation returns all errors, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GatewayConfig;
pub use validation::{validate_config, ConfigError};
