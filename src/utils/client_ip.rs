//! Client address resolution for click accounting.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Returns the client IP for a request.
///
/// Behind a trusted reverse proxy the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise, or when neither header is usable, the socket peer
/// address is used. Forwarding headers are ignored when not behind a proxy
/// since any client can set them.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, behind_proxy: bool) -> String {
    if behind_proxy && let Some(forwarded) = forwarded_ip(headers) {
        return forwarded;
    }
    peer.ip().to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}
