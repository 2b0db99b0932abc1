//! Request middleware: rate limiting, body size limit, security headers and
//! response counting.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::error::ApiError;
use super::AppState;
use crate::rate_limit::client_key;

const CONTENT_SECURITY_POLICY: &str = "default-src 'self' http://localhost:5173 data: blob:; \
     img-src * data: blob:; connect-src *; \
     style-src 'self' 'unsafe-inline' http://localhost:5173; \
     script-src 'self' 'unsafe-inline'";

/// Socket peer of the request, when the server was started with connect info.
pub fn peer_addr(request: &Request) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Reject clients that exceed their quota with 429.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let key = client_key(request.headers(), peer_addr(&request));
    let decision = state.limiter.check(&key, request.uri().path()).await;

    if !decision.allowed {
        debug!("Rate limited {} on {}", key, request.uri().path());
        state.metrics.record_rate_limited();
        return ApiError::TooManyRequests {
            retry_after: decision.retry_after_secs(),
        }
        .into_response();
    }

    next.run(request).await
}

/// Reject requests whose declared Content-Length exceeds the configured limit.
pub async fn limit_body(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let max = state.settings.max_body_bytes;
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if max > 0 && declared.is_some_and(|len| len > max) {
        return ApiError::PayloadTooLarge.into_response();
    }

    next.run(request).await
}

/// Add hardening headers to every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("referrer-policy", HeaderValue::from_static("no-referrer"));
    headers.insert(
        "permissions-policy",
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );
    if !headers.contains_key(header::CONTENT_SECURITY_POLICY) {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        );
    }

    response
}

/// Count responses by status class.
pub async fn track_responses(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    state.metrics.record_response(response.status());
    response
}
