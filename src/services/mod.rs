//! Services module
//!
//! Contains the relay logic and the upstream provider integration.

pub mod gemini;
pub mod relay;
pub mod upstream;

pub use gemini::GeminiClient;
pub use relay::{RelayConfig, RelayOutcome, RelayService};
pub use upstream::{CompletionClient, UpstreamError};
