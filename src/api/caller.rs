//! Resolves the caller identity used as the rate-limit key.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::AppState;
use crate::domain::CallerId;

/// First `X-Forwarded-For` entry, then `X-Real-IP` (both only when forwarded
/// headers are trusted), then the socket peer, then anonymous.
#[must_use]
pub fn resolve_caller(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> CallerId {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return CallerId::new(ip);
        }
    }

    peer.map_or_else(CallerId::anonymous, |addr| CallerId::new(addr.ip().to_string()))
}

pub async fn caller_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let caller = resolve_caller(
        req.headers(),
        peer,
        state.config().rate_limit.trust_forwarded_headers,
    );
    req.extensions_mut().insert(caller);

    next.run(req).await
}
