use std::{sync::Arc, time::Instant};

use axum::{
    body::Body,
    extract::State as AxumState,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info};

use crate::{
    error::AppError,
    state::State,
    utils::{ClientIp, REQUEST_ID_HEADER, client_ip, request_id},
};

const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-xss-protection", "1; mode=block"),
];

/// Request id, client address, tracing span, security headers and access log.
pub async fn request_context(mut request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let request_id = request_id(request.headers());

    let ip = client_ip(request.headers(), request.extensions());
    request.extensions_mut().insert(ClientIp(ip));

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );

    let mut response = next.run(request).instrument(span).await;

    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }

    if !route.starts_with("/health") {
        info!(
            request_id = %request_id,
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "{method} {route}"
        );
    }

    response
}

pub async fn rate_limit(
    AxumState(state): AxumState<Arc<State>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let key = request
        .extensions()
        .get::<ClientIp>()
        .map(|ClientIp(ip)| ip.clone())
        .unwrap_or_else(|| client_ip(request.headers(), request.extensions()));

    if !state.limiter.allow(&key).await {
        return AppError::RateLimited {
            retry_after: state.limiter.window_secs(),
        }
        .into_response();
    }

    next.run(request).await
}
