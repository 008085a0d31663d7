//! Lifecycle management.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config from env → Validate → Bind listener → Start server + sweeper
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C / trigger() → broadcast → server drains, sweeper exits
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
