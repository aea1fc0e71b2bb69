//! Request logging middleware
//!
//! Logs every request with its status and duration and tags the response
//! with a trace id so widget-side errors can be matched to server logs.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Header name for trace ID
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Header name for request ID (alias for trace ID)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request trace id, taken from the caller or generated
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new trace ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Reuse the caller's id when one is supplied
    fn from_headers(headers: &HeaderMap) -> Self {
        [TRACE_ID_HEADER, REQUEST_ID_HEADER]
            .iter()
            .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
            .filter(|id| !id.is_empty())
            .map(|id| Self(id.to_string()))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Middleware to log HTTP requests and responses
pub async fn log_request(request: Request, next: Next) -> Response<Body> {
    let start = Instant::now();
    let trace_id = TraceId::from_headers(request.headers());

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );
    let mut response = next.run(request).instrument(span).await;

    let duration_ms = format!("{:.2}", start.elapsed().as_secs_f64() * 1000.0);
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, method = %method, path = %path, status = status.as_u16(), duration_ms = %duration_ms, "Server error");
    } else if status.is_client_error() {
        tracing::warn!(trace_id = %trace_id, method = %method, path = %path, status = status.as_u16(), duration_ms = %duration_ms, "Client error");
    } else {
        tracing::info!(trace_id = %trace_id, method = %method, path = %path, status = status.as_u16(), duration_ms = %duration_ms, "Request completed");
    }

    if let Ok(header_value) = HeaderValue::from_str(trace_id.as_str()) {
        response
            .headers_mut()
            .insert(TRACE_ID_HEADER, header_value.clone());
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    response
}
