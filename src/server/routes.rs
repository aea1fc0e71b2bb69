//! Application routing
//!
//! This module defines all HTTP routes for the application.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::{completion, health};
use crate::config::Settings;
use crate::middleware::{log_request, REQUEST_ID_HEADER, TRACE_ID_HEADER};
use crate::server::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // Health check (never touches upstream)
    let health_routes = Router::new().route("/health", get(health::health_check));

    // Relay route, body size capped before JSON parsing
    let relay_routes = Router::new()
        .route("/gemini", post(completion::relay_prompt))
        .layer(DefaultBodyLimit::max(state.settings.body_limit_bytes));

    Router::new()
        .nest("/api", relay_routes)
        .merge(health_routes)
        // Apply middleware layers (last added = outermost = runs first)
        .layer(create_cors_layer(&state.settings))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Only the configured widget origins may call cross-origin, and only POST
fn create_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .expose_headers([
            HeaderName::from_static(TRACE_ID_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::upstream::fake::FakeClient;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router() -> Router {
        let client = Arc::new(FakeClient::text(Duration::ZERO, "ok"));
        create_router(AppState::with_client(Settings::new("test-key"), client))
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/gemini")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_preflight_from_dev_origin_allowed() {
        let response = router()
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    }

    #[tokio::test]
    async fn test_preflight_from_unknown_origin_not_allowed() {
        let response = router()
            .oneshot(preflight("https://evil.example"))
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_health_never_calls_upstream() {
        let client = Arc::new(FakeClient::hang());
        let app = create_router(AppState::with_client(Settings::new("test-key"), client.clone()));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_trace_id_echoed() {
        let response = router()
            .oneshot(
                Request::get("/health")
                    .header(TRACE_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[TRACE_ID_HEADER], "abc-123");
        assert_eq!(response.headers()[REQUEST_ID_HEADER], "abc-123");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router()
            .oneshot(Request::get("/api/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
