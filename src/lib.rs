//! Lesson assistant prompt relay
//!
//! Keeps the Gemini API key on the server: the course chat widget posts a
//! prompt here and gets back the generated text or a small JSON error.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod schemas;
pub mod server;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use error::RelayError;
pub use server::App;
