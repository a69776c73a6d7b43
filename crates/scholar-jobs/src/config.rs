//! Job queue settings.

use std::time::Duration;

/// Job queue configuration.
#[derive(Debug, Clone)]
pub struct JobQueueConfig {
    /// A subscriber waiting this long without an event receives a keep-alive.
    pub heartbeat_interval: Duration,

    /// Finished jobs whose feeds stay available to late subscribers.
    pub finished_retention: usize,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            finished_retention: 1024,
        }
    }
}
