//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (stamp security response headers, outermost)
//!     → allow_list.rs (reject disallowed client addresses)
//!     → [router dispatches; /terminal/* additionally passes the
//!        auth gate and idle-timeout filters in http/server.rs]
//!
//! POST /login:
//!     → attempts.rs (permit / record_failure / reset per client address)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a non-allow-listed address never reaches routing
//! - The attempt table is the only shared mutable state in the process

pub mod allow_list;
pub mod attempts;
pub mod headers;

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub use attempts::AttemptLimiter;

/// Resolve the client address attributed to a request.
///
/// The TCP peer is authoritative unless the operator opted into trusting a
/// fronting proxy, in which case the leftmost `X-Forwarded-For` entry wins.
/// The returned string feeds the allow-list and the attempt limiter.
pub fn client_addr(headers: &HeaderMap, peer: SocketAddr, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    peer.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "192.0.2.10:44321".parse().unwrap()
    }

    #[test]
    fn uses_tcp_peer_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7"));
        assert_eq!(client_addr(&headers, peer(), false), "192.0.2.10");
    }

    #[test]
    fn trusted_proxy_takes_leftmost_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("10.0.0.7, 172.16.0.1"),
        );
        assert_eq!(client_addr(&headers, peer(), true), "10.0.0.7");
    }

    #[test]
    fn trusted_proxy_falls_back_to_peer_without_header() {
        assert_eq!(client_addr(&HeaderMap::new(), peer(), true), "192.0.2.10");
    }
}
