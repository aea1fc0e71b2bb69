//! Google Gemini API schema definitions
//!
//! Only the slice of the `generateContent` REST contract the relay needs:
//! a single-turn text request and the candidate/feedback fields of the
//! response.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Gemini API request body for generateContent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    /// The content of the conversation
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    /// Single user turn carrying the prompt verbatim
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent::user(prompt)],
        }
    }
}

/// Content block containing role and parts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role: "user" or "model"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl GeminiContent {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// A part of the content. Non-text parts are tolerated and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// Gemini API response for generateContent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Absent when the prompt itself was blocked
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

/// A candidate response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Missing when generation stopped before producing output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<GeminiContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Why the prompt was refused before generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason_message: Option<String>,
}

/// Usage metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: i32,

    #[serde(default)]
    pub candidates_token_count: i32,

    #[serde(default)]
    pub total_token_count: i32,
}

/// How a response failed to yield text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextUnavailable {
    /// The prompt was refused; carries the provider's block reason
    Blocked(String),
    /// Generation stopped for a reason that voids the output
    BadFinish(String),
    /// No candidates and no explanation
    Empty,
}

impl GeminiResponse {
    /// Text of the first candidate, every text part joined in order.
    pub fn text(&self) -> Result<String, TextUnavailable> {
        let Some(candidate) = self.candidates.first() else {
            return Err(match self.block_reason() {
                Some(reason) => TextUnavailable::Blocked(reason),
                None => TextUnavailable::Empty,
            });
        };

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|reason| finish_reason::is_bad(reason))
        {
            return Err(TextUnavailable::BadFinish(reason.to_string()));
        }

        Ok(candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect())
    }

    fn block_reason(&self) -> Option<String> {
        let feedback = self.prompt_feedback.as_ref()?;
        feedback
            .block_reason_message
            .clone()
            .or_else(|| feedback.block_reason.clone())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Gemini API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiError {
    pub error: GeminiErrorDetail,
}

/// Gemini error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiErrorDetail {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Finish reasons
pub mod finish_reason {
    pub const STOP: &str = "STOP";
    pub const MAX_TOKENS: &str = "MAX_TOKENS";
    pub const SAFETY: &str = "SAFETY";
    pub const RECITATION: &str = "RECITATION";
    pub const OTHER: &str = "OTHER";

    /// Reasons after which the candidate text must not be used
    pub fn is_bad(reason: &str) -> bool {
        matches!(reason, SAFETY | RECITATION | OTHER)
    }
}
