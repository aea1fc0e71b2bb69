//! Relay error types
//!
//! Every failure a request can hit ends up as a `RelayError`, which renders
//! itself as the `{error, details?}` body with a fixed status per kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use thiserror::Error;

use crate::schemas::ErrorBody;
use crate::services::UpstreamError;

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const INVALID_BODY: &str = "Invalid request body";
pub const BODY_TOO_LARGE: &str = "Request body too large";
pub const TIMED_OUT: &str = "Request timed out";
pub const TIMED_OUT_DETAILS: &str = "The AI took too long to respond";
pub const UPSTREAM_FAILED: &str = "Failed to get AI response";

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Prompt is required")]
    PromptRequired,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::PromptRequired | RelayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Upstream(_) | RelayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The JSON body sent to the caller
    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            RelayError::PromptRequired => (PROMPT_REQUIRED, None),
            RelayError::InvalidBody(reason) => (INVALID_BODY, Some(reason.clone())),
            RelayError::PayloadTooLarge(limit) => {
                (BODY_TOO_LARGE, Some(format!("The limit is {} bytes", limit)))
            }
            RelayError::Timeout(_) => (TIMED_OUT, Some(TIMED_OUT_DETAILS.to_string())),
            RelayError::Upstream(err) => (UPSTREAM_FAILED, Some(err.to_string())),
            RelayError::Internal(err) => (UPSTREAM_FAILED, Some(err.to_string())),
        };

        ErrorBody {
            error: error.to_string(),
            details,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
