//! Application state container
//!
//! This module defines the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::config::Settings;
use crate::services::{CompletionClient, GeminiClient, RelayConfig, RelayService};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
///
/// Read-only after startup and cheap to clone. Requests share nothing
/// mutable through it.
#[derive(Clone)]
pub struct AppState {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Relay to the upstream provider
    pub relay: RelayService,

    /// Application start time (for uptime calculation)
    pub start_time: Instant,
}

impl AppState {
    /// Create state backed by the real Gemini client
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        tracing::debug!(gemini = ?settings.gemini, "Creating Gemini client");
        let client = GeminiClient::new(&settings.gemini)?;

        Ok(Self::with_client(settings, Arc::new(client)))
    }

    /// Create state around any completion client
    pub fn with_client(settings: Settings, client: Arc<dyn CompletionClient>) -> Self {
        let relay = RelayService::new(client, RelayConfig::from_settings(&settings));

        tracing::info!(
            timeout_seconds = relay.timeout().as_secs(),
            max_concurrent_upstream = ?settings.max_concurrent_upstream,
            "Application state initialized successfully"
        );

        Self {
            settings: Arc::new(settings),
            relay,
            start_time: Instant::now(),
        }
    }

    /// Get the application uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
