//! First-to-settle race between an operation and a deadline

use std::future::Future;
use std::time::Duration;

/// Error type for timeout operations
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Inner(E),
}

/// Race `future` against a `timeout` timer.
///
/// Whichever settles first decides the result. When the timer wins the
/// future is dropped, so a late result can never leak into the response.
pub async fn with_timeout<T, E>(
    timeout: Duration,
    future: impl Future<Output = Result<T, E>>,
) -> Result<T, TimeoutError<E>> {
    match tokio::time::timeout(timeout, future).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(TimeoutError::Inner(err)),
        Err(_) => Err(TimeoutError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_value_before_deadline() {
        let result: Result<&str, TimeoutError<String>> = with_timeout(Duration::from_secs(30), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok("done")
        })
        .await;

        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test(start_paused = true)]
    async fn test_inner_error_before_deadline() {
        let result: Result<(), TimeoutError<String>> =
            with_timeout(Duration::from_secs(30), async { Err("boom".to_string()) }).await;

        assert!(matches!(result, Err(TimeoutError::Inner(ref e)) if e == "boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_and_drops_late_result() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result: Result<(), TimeoutError<String>> = with_timeout(Duration::from_secs(30), async move {
            tokio::time::sleep(Duration::from_secs(31)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(TimeoutError::Timeout(d)) if d == Duration::from_secs(30)));

        // The losing future was dropped, so it never completes.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
