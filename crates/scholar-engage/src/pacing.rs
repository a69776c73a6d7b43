//! Pacing between consecutive Engage calls.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{EngageError, EngageResult};

/// Wait Engage needs between two calls.
pub const DEFAULT_PACING_INTERVAL: Duration = Duration::from_secs(2);

/// Suspends a refresh between upstream calls.
///
/// The wait is also the refresh's cancellation checkpoint: it returns
/// [`EngageError::Cancelled`] the moment the token fires.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_INTERVAL)
    }
}

impl Pacer {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub async fn pace(&self, cancel: &CancellationToken) -> EngageResult<()> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(EngageError::Cancelled),
            () = tokio::time::sleep(self.interval) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_waits_interval() {
        let pacer = Pacer::new(Duration::from_millis(20));
        let started = Instant::now();
        pacer.pace(&CancellationToken::new()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_already_cancelled_returns_immediately() {
        let pacer = Pacer::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();
        let err = pacer.pace(&token).await.unwrap_err();
        assert!(matches!(err, EngageError::Cancelled));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_wait() {
        let pacer = Pacer::new(Duration::from_secs(60));
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), pacer.pace(&token))
            .await
            .expect("pace should return once cancelled");
        assert!(matches!(result, Err(EngageError::Cancelled)));
    }
}
