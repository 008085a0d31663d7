//! Single-upstream reverse proxy.
//!
//! # Data Flow
//! ```text
//! Authenticated request for /terminal/...
//!     → forward.rs (strip prefix, rewrite scheme/authority/Host,
//!       drop hop-by-hop headers, forward via the shared hyper client)
//!     → upstream response streamed back without buffering
//!
//! WebSocket upgrade (Connection: upgrade + Upgrade: websocket)
//!     → upgrade.rs (forward handshake intact, mirror the 101,
//!       then splice the two raw connections until either side closes)
//! ```
//!
//! # Design Decisions
//! - One upstream, parsed once at startup; an invalid URL is fatal
//! - Client cancellation aborts the upstream call (the handler future and
//!   the in-flight request are dropped together)
//! - Upstream failures surface as 502 with a minimal body

pub mod forward;
pub mod upgrade;

pub use forward::{proxy_handler, UpstreamTarget, PROTECTED_PREFIX};
