//! Gemini client for Google Gemini API interactions
//!
//! This module calls the `generateContent` REST endpoint with the
//! server-held API key and reduces the response to plain text.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::GeminiSettings;
use crate::schemas::gemini::{GeminiError, GeminiRequest, GeminiResponse, TextUnavailable};
use crate::schemas::UpstreamCompletion;
use crate::services::upstream::{CompletionClient, UpstreamError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Gemini REST API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// No overall request timeout is set here: the relay bounds the wait
    /// itself and drops the request future when that bound is hit.
    pub fn new(settings: &GeminiSettings) -> Result<Self, UpstreamError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        tracing::info!(
            model = %settings.model,
            base_url = %settings.base_url,
            "Initialized Gemini client"
        );

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Generate content (non-streaming)
    pub async fn generate_content(
        &self,
        request: &GeminiRequest,
    ) -> Result<GeminiResponse, UpstreamError> {
        let url = self.endpoint();

        tracing::debug!(model = %self.model, url = %url, "Calling Gemini generateContent API");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            // Prefer the provider's own message over the raw body
            if let Ok(gemini_error) = serde_json::from_str::<GeminiError>(&body) {
                return Err(UpstreamError::Api {
                    code: gemini_error.error.code,
                    message: gemini_error.error.message,
                });
            }

            // Non-provider bodies (proxy pages, HTML) stay in the logs only
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate(&body, MAX_LOGGED_BODY_CHARS),
                "Gemini returned an unrecognised error body"
            );
            return Err(UpstreamError::Api {
                code: i32::from(status.as_u16()),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected upstream status")
                    .to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Gemini response");
            UpstreamError::Parse(e.to_string())
        })
    }
}

const MAX_LOGGED_BODY_CHARS: usize = 200;

fn truncate(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<UpstreamCompletion, UpstreamError> {
        let response = self
            .generate_content(&GeminiRequest::from_prompt(prompt))
            .await?;

        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                completion_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini usage"
            );
        }

        match response.text() {
            Ok(text) => Ok(UpstreamCompletion::new(text)),
            Err(TextUnavailable::Blocked(reason)) => Err(UpstreamError::Blocked(reason)),
            Err(TextUnavailable::BadFinish(reason)) => Err(UpstreamError::BadFinish(reason)),
            Err(TextUnavailable::Empty) => Err(UpstreamError::Empty),
        }
    }

    fn describe(&self) -> String {
        format!("gemini/{}", self.model)
    }
}
