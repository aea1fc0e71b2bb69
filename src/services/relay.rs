//! Prompt relay
//!
//! Forwards one validated prompt to the upstream provider and bounds how
//! long the caller waits. Each call walks
//! `Received -> AwaitingUpstream -> {Completed | TimedOut | Failed}` and
//! produces exactly one result. Nothing is retried: the caller decides
//! whether to resubmit.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::config::Settings;
use crate::error::RelayError;
use crate::schemas::{PromptRequest, UpstreamCompletion};
use crate::services::upstream::CompletionClient;
use crate::utils::{with_timeout, TimeoutError};

/// Relay tuning, taken from `Settings` at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Wall-clock bound on waiting for the provider
    pub timeout: Duration,

    /// Optional bound on in-flight upstream calls
    pub max_concurrent_upstream: Option<usize>,
}

impl RelayConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_concurrent_upstream: None,
        }
    }

    pub fn with_max_concurrent_upstream(mut self, limit: usize) -> Self {
        self.max_concurrent_upstream = Some(limit);
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout: settings.upstream_timeout(),
            max_concurrent_upstream: settings.max_concurrent_upstream,
        }
    }
}

/// Terminal state of one relayed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Completed,
    TimedOut,
    Failed,
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayOutcome::Completed => write!(f, "completed"),
            RelayOutcome::TimedOut => write!(f, "timed_out"),
            RelayOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// Stateless relay between callers and a `CompletionClient`
#[derive(Clone)]
pub struct RelayService {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
    limiter: Option<Arc<Semaphore>>,
}

impl RelayService {
    pub fn new(client: Arc<dyn CompletionClient>, config: RelayConfig) -> Self {
        let limiter = config
            .max_concurrent_upstream
            .map(|limit| Arc::new(Semaphore::new(limit)));

        Self {
            client,
            timeout: config.timeout,
            limiter,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward `request` upstream, racing the configured timeout.
    ///
    /// Time spent waiting for a concurrency permit counts against the
    /// timeout, so the caller's total wait stays bounded.
    pub async fn relay(&self, request: PromptRequest) -> Result<UpstreamCompletion, RelayError> {
        let start = Instant::now();

        tracing::debug!(
            upstream = %self.client.describe(),
            received_at = %request.received_at.to_rfc3339(),
            "Awaiting upstream"
        );

        let call = async {
            let _permit = self.acquire_permit().await?;
            self.client
                .complete(&request.prompt)
                .await
                .map_err(RelayError::from)
        };

        let (outcome, result) = match with_timeout(self.timeout, call).await {
            Ok(completion) => (RelayOutcome::Completed, Ok(completion)),
            Err(TimeoutError::Timeout(after)) => (RelayOutcome::TimedOut, Err(RelayError::Timeout(after))),
            Err(TimeoutError::Inner(err)) => (RelayOutcome::Failed, Err(err)),
        };

        let duration_ms = start.elapsed().as_millis();
        match &result {
            Ok(completion) => tracing::info!(
                outcome = %outcome,
                duration_ms = duration_ms,
                response_length = completion.text.chars().count(),
                "Response generated successfully"
            ),
            Err(err) => tracing::error!(
                outcome = %outcome,
                duration_ms = duration_ms,
                error = %err,
                "Upstream call did not complete"
            ),
        }

        result
    }

    async fn acquire_permit(&self) -> Result<Option<SemaphorePermit<'_>>, RelayError> {
        match &self.limiter {
            Some(limiter) => limiter
                .acquire()
                .await
                .map(Some)
                .map_err(|e| RelayError::Internal(e.into())),
            None => Ok(None),
        }
    }
}
