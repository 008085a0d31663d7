//! Request rewriting and upstream forwarding.

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::Uri, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::upgrade::OnUpgrade;
use url::Url;

use crate::http::server::AppState;
use crate::proxy::upgrade;

/// Path prefix under which the proxy is mounted; stripped before forwarding.
pub const PROTECTED_PREFIX: &str = "/terminal";

/// Hop-by-hop headers never forwarded to the upstream. `Connection` and
/// `Upgrade` are handled separately so WebSocket handshakes pass through.
const HOP_BY_HOP: [HeaderName; 5] = [
    HeaderName::from_static("proxy-connection"),
    HeaderName::from_static("keep-alive"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

/// The upstream terminal service, parsed once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: String,
    authority: String,
}

impl UpstreamTarget {
    /// Parse the configured upstream URL. Fails on anything without a host;
    /// startup treats that as fatal.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let url = Url::parse(raw).map_err(|e| e.to_string())?;
        let host = url.host_str().ok_or_else(|| "missing host".to_string())?;
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
        })
    }

    /// Host:port the upstream is addressed by; also the forwarded `Host`.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Rewrite an incoming request path to the upstream's URI space:
    /// the protected prefix is stripped (an empty remainder becomes `/`)
    /// and the query string is preserved.
    pub fn uri_for(&self, path: &str, query: Option<&str>) -> Result<Uri, axum::http::Error> {
        let stripped = strip_protected_prefix(path);
        let path_and_query = match query {
            Some(query) => format!("{stripped}?{query}"),
            None => stripped.to_string(),
        };
        Uri::builder()
            .scheme(self.scheme.as_str())
            .authority(self.authority.as_str())
            .path_and_query(path_and_query)
            .build()
    }
}

fn strip_protected_prefix(path: &str) -> &str {
    let stripped = path.strip_prefix(PROTECTED_PREFIX).unwrap_or(path);
    if stripped.is_empty() {
        "/"
    } else {
        stripped
    }
}

/// Headers to forward upstream: everything the client sent minus hop-by-hop
/// headers, with `Host` rewritten to the upstream authority. For WebSocket
/// upgrades the `Connection` and `Upgrade` headers stay intact so the
/// upstream sees the handshake.
fn forward_headers(incoming: &HeaderMap, authority: &str, is_upgrade: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(incoming.len());
    for (name, value) in incoming {
        if HOP_BY_HOP.contains(name) || *name == header::HOST {
            continue;
        }
        if !is_upgrade && (*name == header::CONNECTION || *name == header::UPGRADE) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    if let Ok(host) = HeaderValue::from_str(authority) {
        headers.insert(header::HOST, host);
    }
    headers
}

/// Forward a request to the upstream terminal service.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let is_upgrade = upgrade::is_websocket_upgrade(request.headers());
    let (mut parts, body) = request.into_parts();
    let client_upgrade = parts.extensions.remove::<OnUpgrade>();

    let uri = match state.upstream.uri_for(parts.uri.path(), parts.uri.query()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, path = %parts.uri.path(), "Failed to build upstream URI");
            return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
        }
    };

    tracing::debug!(method = %parts.method, uri = %uri, upgrade = is_upgrade, "Proxying request");

    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        *headers = forward_headers(&parts.headers, state.upstream.authority(), is_upgrade);
    }
    // Upgrade requests carry no body; the raw connection takes over after 101.
    let outbound = match builder.body(if is_upgrade { Body::empty() } else { body }) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream request");
            return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
        }
    };

    let upstream_response = match state.client.request(outbound).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
        }
    };

    if upstream_response.status() == StatusCode::SWITCHING_PROTOCOLS {
        return upgrade::splice(upstream_response, client_upgrade);
    }

    // Stream the body through; no buffering. Hop-by-hop response headers
    // are dropped — hyper re-frames the body towards the client.
    let (mut parts, body) = upstream_response.into_parts();
    for name in &HOP_BY_HOP {
        parts.headers.remove(name);
    }
    parts.headers.remove(header::CONNECTION);
    parts.headers.remove(header::UPGRADE);
    Response::from_parts(parts, Body::new(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> UpstreamTarget {
        UpstreamTarget::parse("http://localhost:7681").unwrap()
    }

    #[test]
    fn parse_keeps_host_and_port() {
        let target = target();
        assert_eq!(target.authority(), "localhost:7681");
    }

    #[test]
    fn parse_without_port_uses_bare_host() {
        let target = UpstreamTarget::parse("http://terminal.internal").unwrap();
        assert_eq!(target.authority(), "terminal.internal");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(UpstreamTarget::parse("not a url").is_err());
        assert!(UpstreamTarget::parse("data:text/plain,hi").is_err());
    }

    #[test]
    fn uri_strips_protected_prefix() {
        let uri = target().uri_for("/terminal/foo", None).unwrap();
        assert_eq!(uri.path(), "/foo");
        assert_eq!(uri.host(), Some("localhost"));
        assert_eq!(uri.port_u16(), Some(7681));
    }

    #[test]
    fn bare_prefix_becomes_root() {
        let uri = target().uri_for("/terminal", None).unwrap();
        assert_eq!(uri.path(), "/");
    }

    #[test]
    fn query_is_preserved() {
        let uri = target().uri_for("/terminal/foo", Some("x=1&y=2")).unwrap();
        assert_eq!(uri.path(), "/foo");
        assert_eq!(uri.query(), Some("x=1&y=2"));
    }

    #[test]
    fn forward_headers_drop_hop_by_hop() {
        let mut incoming = HeaderMap::new();
        incoming.insert(header::HOST, HeaderValue::from_static("gateway.example"));
        incoming.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        incoming.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        incoming.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        incoming.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        let headers = forward_headers(&incoming, "localhost:7681", false);
        assert_eq!(headers.get(header::HOST).unwrap(), "localhost:7681");
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "*/*");
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
    }

    #[test]
    fn forward_headers_keep_upgrade_handshake() {
        let mut incoming = HeaderMap::new();
        incoming.insert(header::CONNECTION, HeaderValue::from_static("Upgrade"));
        incoming.insert(header::UPGRADE, HeaderValue::from_static("websocket"));
        incoming.insert("sec-websocket-key", HeaderValue::from_static("dGhlIHNhbXBsZSBub25jZQ=="));

        let headers = forward_headers(&incoming, "localhost:7681", true);
        assert_eq!(headers.get(header::CONNECTION).unwrap(), "Upgrade");
        assert_eq!(headers.get(header::UPGRADE).unwrap(), "websocket");
        assert!(headers.get("sec-websocket-key").is_some());
    }
}
