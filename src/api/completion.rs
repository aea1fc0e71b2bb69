//! Prompt relay endpoint
//!
//! `POST /api/gemini` takes `{prompt}` from the chat widget, forwards it to
//! the upstream provider and answers `{text}` or `{error, details?}`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::error::RelayError;
use crate::schemas::{PromptPayload, PromptRequest, UpstreamCompletion};
use crate::server::state::AppState;

/// POST /api/gemini - relay a prompt upstream
///
/// A missing or blank prompt is answered with 400 before any upstream
/// call is made.
pub async fn relay_prompt(
    State(state): State<AppState>,
    payload: Result<Json<PromptPayload>, JsonRejection>,
) -> Result<Json<UpstreamCompletion>, RelayError> {
    let Json(payload) = payload.map_err(|rejection| reject_body(rejection, &state))?;

    let request = PromptRequest::from_payload(payload).ok_or(RelayError::PromptRequired)?;

    tracing::info!(
        received_at = %request.received_at.to_rfc3339(),
        prompt_length = request.char_len(),
        "Received prompt"
    );

    let completion = state.relay.relay(request).await?;

    Ok(Json(completion))
}

fn reject_body(rejection: JsonRejection, state: &AppState) -> RelayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return RelayError::PayloadTooLarge(state.settings.body_limit_bytes);
    }
    RelayError::InvalidBody(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::schemas::ErrorBody;
    use crate::server::routes::create_router;
    use crate::services::upstream::fake::{FakeClient, Reply};
    use axum::{
        body::Body,
        http::{header, Request},
        response::Response,
        Router,
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app(client: Arc<FakeClient>) -> Router {
        create_router(AppState::with_client(Settings::new("test-key"), client))
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::post("/api/gemini")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_summarize_scenario() {
        let client = Arc::new(FakeClient::text(
            Duration::from_millis(100),
            "This lesson covers X.",
        ));

        let response = app(client.clone())
            .oneshot(post_json(r#"{"prompt": "Summarize this lesson."}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"text": "This lesson covers X."}));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_400_without_upstream_call() {
        let client = Arc::new(FakeClient::text(Duration::ZERO, "unused"));

        for body in [r#"{"prompt": ""}"#, r#"{"prompt": "   "}"#, "{}", r#"{"prompt": null}"#] {
            let response = app(client.clone()).oneshot(post_json(body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(body_json(response).await, json!({"error": "Prompt is required"}));
        }

        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_400_without_upstream_call() {
        let client = Arc::new(FakeClient::text(Duration::ZERO, "unused"));

        let response = app(client.clone())
            .oneshot(post_json("{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.error, "Invalid request body");
        assert!(body.details.is_some());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let client = Arc::new(FakeClient::text(Duration::ZERO, "unused"));
        let mut settings = Settings::new("test-key");
        settings.body_limit_bytes = 64;
        let app = create_router(AppState::with_client(settings, client.clone()));

        let prompt = "x".repeat(256);
        let response = app
            .oneshot(post_json(json!({ "prompt": prompt }).to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["error"], "Request body too large");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_resolving_upstream_is_504() {
        let client = Arc::new(FakeClient::hang());

        let response = app(client)
            .oneshot(post_json(r#"{"prompt": "Summarize this lesson."}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Request timed out", "details": "The AI took too long to respond"})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_success_still_504() {
        let client = Arc::new(FakeClient::text(Duration::from_secs(31), "too late"));

        let response = app(client)
            .oneshot(post_json(r#"{"prompt": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn test_upstream_error_is_500_with_details() {
        let client = Arc::new(FakeClient::error("Resource has been exhausted"));

        let response = app(client)
            .oneshot(post_json(r#"{"prompt": "hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorBody = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(body.error, "Failed to get AI response");
        assert!(body.details.unwrap().contains("Resource has been exhausted"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_does_not_delay_fast_one() {
        let client = Arc::new(FakeClient::scripted(|prompt| match prompt {
            "slow" => Reply::Text {
                delay: Duration::from_secs(60),
                text: "slow answer".to_string(),
            },
            _ => Reply::Text {
                delay: Duration::from_millis(100),
                text: "fast answer".to_string(),
            },
        }));
        let app = app(client);
        let start = tokio::time::Instant::now();

        let slow = async {
            let response = app.clone().oneshot(post_json(r#"{"prompt": "slow"}"#)).await.unwrap();
            (response, start.elapsed())
        };
        let fast = async {
            let response = app.clone().oneshot(post_json(r#"{"prompt": "fast"}"#)).await.unwrap();
            (response, start.elapsed())
        };
        let ((slow_response, slow_at), (fast_response, fast_at)) = tokio::join!(slow, fast);

        assert!(fast_at < slow_at);
        assert!(fast_at < Duration::from_secs(1));
        assert_eq!(fast_response.status(), StatusCode::OK);
        assert_eq!(body_json(fast_response).await, json!({"text": "fast answer"}));
        assert_eq!(slow_response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
