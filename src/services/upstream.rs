//! Upstream completion client abstraction
//!
//! The relay only needs "prompt in, text out" from a provider. Keeping that
//! behind a trait lets the HTTP layer run against a fake in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::schemas::UpstreamCompletion;

/// Errors that can occur when calling the upstream provider
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("[{code}] {message}")]
    Api { code: i32, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Text not available. Response was blocked due to {0}")]
    Blocked(String),

    #[error("Candidate was blocked due to {0}")]
    BadFinish(String),

    #[error("Response contained no candidates")]
    Empty,
}

/// A provider that turns a prompt into generated text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<UpstreamCompletion, UpstreamError>;

    /// Short provider/model label for logs
    fn describe(&self) -> String;
}
