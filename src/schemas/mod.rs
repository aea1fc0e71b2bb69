//! Schema module
//!
//! Request/response types for the relay's HTTP contract and the upstream
//! Gemini REST API.

pub mod gemini;
pub mod relay;

pub use relay::{ErrorBody, HealthResponse, PromptPayload, PromptRequest, UpstreamCompletion};
