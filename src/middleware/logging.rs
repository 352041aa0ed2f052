//! Request logging middleware
//!
//! Wraps every request in a span carrying a request id, logs the outcome
//! with its latency, and echoes the id back in `x-request-id`.

use std::time::Instant;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, warn, Instrument};
use crate::utils::helpers::generate_uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request id that is reused
const MAX_REQUEST_ID_LEN: usize = 128;

/// Reuse a sane client request id or generate a new one
pub fn request_id_from(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .map(str::to_string)
        .unwrap_or_else(generate_uuid)
}

pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let request_id = request_id_from(request.headers());

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let mut response = next.run(request).instrument(span.clone()).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_millis() as u64;
    span.in_scope(|| {
        if status >= 500 {
            warn!(status = status, latency_ms = latency_ms, "Request failed");
        } else {
            info!(status = status, latency_ms = latency_ms, "Request completed");
        }
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_reused_when_valid() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id_from(&headers), "abc-123");
    }

    #[test]
    fn test_request_id_generated_when_missing_or_invalid() {
        let generated = request_id_from(&HeaderMap::new());
        assert_eq!(generated.len(), 36);

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("bad id;"));
        assert_ne!(request_id_from(&headers), "bad id;");
    }
}
