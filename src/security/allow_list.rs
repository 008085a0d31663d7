//! Client-address allow-listing.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::http::server::AppState;
use crate::security::client_addr;

/// Whether `addr` matches the configured prefix list. An empty list allows
/// everything. Matching is textual: an entry matches on equality or as a
/// leading prefix of the address, which covers dotted-IPv4 administrative
/// prefixes like `10.0.0.`.
pub fn is_allowed(addr: &str, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    allowed
        .iter()
        .any(|entry| entry == addr || addr.starts_with(entry.as_str()))
}

/// Reject requests from addresses outside the configured allow-list with a
/// bare 403. A no-op when the list is empty.
pub async fn allow_list_middleware(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if state.config.allowed_ips.is_empty() {
        return next.run(request).await;
    }

    let addr = client_addr(request.headers(), peer, state.config.trust_proxy);
    if is_allowed(&addr, &state.config.allowed_ips) {
        next.run(request).await
    } else {
        tracing::warn!(addr = %addr, "Blocked request from disallowed address");
        StatusCode::FORBIDDEN.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_list_allows_everything() {
        assert!(is_allowed("192.168.0.5", &[]));
    }

    #[test]
    fn exact_match_allows() {
        assert!(is_allowed("10.0.0.7", &list(&["10.0.0.7"])));
    }

    #[test]
    fn prefix_match_allows() {
        assert!(is_allowed("10.0.0.7", &list(&["10.0.0."])));
        assert!(is_allowed("10.0.0.200", &list(&["10.0.0."])));
    }

    #[test]
    fn non_matching_address_is_denied() {
        assert!(!is_allowed("192.168.0.5", &list(&["10.0.0."])));
        assert!(!is_allowed("10.0.1.7", &list(&["10.0.0."])));
    }

    #[test]
    fn any_entry_may_match() {
        let allowed = list(&["172.16.", "10.0.0.7"]);
        assert!(is_allowed("172.16.9.9", &allowed));
        assert!(is_allowed("10.0.0.7", &allowed));
        assert!(!is_allowed("10.0.0.8", &allowed));
    }
}
