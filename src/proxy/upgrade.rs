//! WebSocket upgrade detection and connection splicing.

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::upgrade::OnUpgrade;
use hyper_util::rt::TokioIo;

/// Whether a request is a WebSocket handshake: a `Connection` header whose
/// token list contains `upgrade` and an `Upgrade: websocket` header, both
/// case-insensitive.
pub fn is_websocket_upgrade(headers: &HeaderMap) -> bool {
    let connection_upgrades = headers
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
        })
        .unwrap_or(false);

    let upgrade_is_websocket = headers
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);

    connection_upgrades && upgrade_is_websocket
}

/// The upstream accepted the handshake: mirror its 101 to the client and
/// splice the two raw connections until either side closes.
///
/// The splice runs in a spawned task because the client connection is only
/// handed over after the 101 response is written.
pub fn splice(
    upstream_response: hyper::Response<hyper::body::Incoming>,
    client_upgrade: Option<OnUpgrade>,
) -> Response {
    let Some(client_upgrade) = client_upgrade else {
        tracing::error!("Upstream switched protocols but the client connection is not upgradable");
        return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
    };

    let mut builder = Response::builder().status(StatusCode::SWITCHING_PROTOCOLS);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in upstream_response.headers() {
            headers.append(name.clone(), value.clone());
        }
    }

    tokio::spawn(async move {
        let upstream_io = match hyper::upgrade::on(upstream_response).await {
            Ok(io) => io,
            Err(e) => {
                tracing::error!(error = %e, "Upstream upgrade failed");
                return;
            }
        };
        let client_io = match client_upgrade.await {
            Ok(io) => io,
            Err(e) => {
                tracing::error!(error = %e, "Client upgrade failed");
                return;
            }
        };

        let mut upstream_io = TokioIo::new(upstream_io);
        let mut client_io = TokioIo::new(client_io);
        match tokio::io::copy_bidirectional(&mut client_io, &mut upstream_io).await {
            Ok((to_upstream, to_client)) => {
                tracing::debug!(to_upstream, to_client, "WebSocket splice closed");
            }
            Err(e) => {
                tracing::debug!(error = %e, "WebSocket splice ended with error");
            }
        }
    });

    match builder.body(Body::empty()) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build switching-protocols response");
            (StatusCode::BAD_GATEWAY, "upstream request failed").into_response()
        }
    }
}
