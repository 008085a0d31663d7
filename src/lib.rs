//! Authenticating reverse proxy for a loopback-bound terminal service.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────┐
//!                   │                    GATEWAY                        │
//!                   │                                                   │
//!   Client ─────────┼─▶ security headers ─▶ IP allow-list ─▶ routing    │
//!                   │                                          │        │
//!                   │        /login /logout / /health ◀────────┤        │
//!                   │                                          │        │
//!                   │        /terminal/* ─▶ auth gate ─▶ idle  │        │
//!                   │                        timeout ─▶ proxy ─┼──▶ ttyd│
//!                   │                                                   │
//!                   │  shared state: sealed-cookie sessions (stateless),│
//!                   │  per-address login attempt table (+ sweeper)      │
//!                   └──────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod proxy;
pub mod security;
pub mod session;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
