//! Wire types of the relay's own HTTP contract
//!
//! These are the shapes the chat widget sees. They stay deliberately small:
//! `{prompt}` in, `{text}` or `{error, details?}` out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw body of `POST /api/gemini`
///
/// `prompt` is optional here so a missing field reaches validation and
/// produces the relay's own 400 body instead of a framework rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptPayload {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// A validated prompt, alive for the duration of one request
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub prompt: String,
    pub received_at: DateTime<Utc>,
}

impl PromptRequest {
    /// Accept the payload if it carries a prompt that is not blank.
    ///
    /// The prompt is forwarded exactly as sent; trimming only decides
    /// whether it counts as present.
    pub fn from_payload(payload: PromptPayload) -> Option<Self> {
        payload
            .prompt
            .filter(|prompt| !prompt.trim().is_empty())
            .map(|prompt| Self {
                prompt,
                received_at: Utc::now(),
            })
    }

    /// Prompt length in characters, for logging
    pub fn char_len(&self) -> usize {
        self.prompt.chars().count()
    }
}

/// Text produced by the upstream provider, passed through unmodified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCompletion {
    pub text: String,
}

impl UpstreamCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Failure body: `{ "error": ..., "details"?: ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
