//! Refresh requests and the context a refresh runs in.
//!
//! A refresh is long-running: it walks pupils or periods one at a time and
//! waits between upstream calls. [`RefreshContext`] carries the cancellation
//! token observed at each of those waits and a sink for progress details.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::ScholarError;
use crate::ids::Pid;
use crate::models::Period;

/// Refresh `n` consecutive pupils starting at `start_pid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStudentsRequest {
    pub start_pid: Pid,
    pub n: u32,
    /// Drop pupils that no longer attend the school.
    #[serde(default)]
    pub purge: bool,
}

impl RefreshStudentsRequest {
    /// The pupil ids covered by the request, in order.
    ///
    /// `Invalid` when the last pid would lie past `i64::MAX`.
    pub fn pids(&self) -> crate::Result<impl Iterator<Item = Pid>> {
        if self.n > 0
            && self
                .start_pid
                .get()
                .checked_add(i64::from(self.n) - 1)
                .is_none()
        {
            return Err(ScholarError::invalid(format!(
                "{} pids from {} run past the largest pupil id",
                self.n, self.start_pid
            )));
        }
        Ok(std::iter::successors(Some(self.start_pid), |pid| pid.next()).take(self.n as usize))
    }
}

/// Refresh one pupil's marks over a period range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshMarksRequest {
    pub pid: Pid,
    pub from: Period,
    pub to: Period,
}

/// Counts of local writes performed by a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub created: u32,
    pub updated: u32,
    pub deleted: u32,
    pub skipped: u32,
    pub unchanged: u32,
}

impl RefreshSummary {
    /// Number of local writes.
    #[must_use]
    pub fn writes(&self) -> u32 {
        self.created + self.updated + self.deleted
    }
}

impl fmt::Display for RefreshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} deleted={} skipped={} unchanged={}",
            self.created, self.updated, self.deleted, self.skipped, self.unchanged
        )
    }
}

/// Receives human-readable progress details from a running refresh.
pub trait ProgressSink: Send + Sync {
    fn report(&self, detail: String);
}

impl<F> ProgressSink for F
where
    F: Fn(String) + Send + Sync,
{
    fn report(&self, detail: String) {
        self(detail);
    }
}

/// Cancellation and progress plumbing handed to a refresh.
#[derive(Clone, Default)]
pub struct RefreshContext {
    cancel: CancellationToken,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl RefreshContext {
    #[must_use]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            progress: None,
        }
    }

    /// A context nobody can cancel and nobody observes.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn report(&self, detail: impl Into<String>) {
        if let Some(sink) = &self.progress {
            sink.report(detail.into());
        }
    }
}

impl fmt::Debug for RefreshContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshContext")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("observed", &self.progress.is_some())
            .finish()
    }
}
