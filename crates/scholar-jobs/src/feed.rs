//! Per-job status feeds.
//!
//! A feed has one writer (the job) and is read through [`Subscription`]s.
//! Events are handed out in emission order; once the terminal status has been
//! pushed the feed accepts nothing more, and every later subscription still
//! receives that terminal status.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

use crate::job::JobStatus;

#[derive(Debug, Default)]
struct FeedState {
    pending: VecDeque<JobStatus>,
    terminal: Option<JobStatus>,
}

#[derive(Debug, Default)]
pub(crate) struct Feed {
    state: Mutex<FeedState>,
    notify: Notify,
}

impl Feed {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a status. Returns `false` if the feed already ended.
    pub(crate) fn push(&self, status: JobStatus) -> bool {
        {
            let mut state = self.lock();
            if state.terminal.is_some() {
                return false;
            }
            if status.is_terminal() {
                state.terminal = Some(status.clone());
            }
            state.pending.push_back(status);
        }
        self.notify.notify_waiters();
        true
    }
}

/// What a subscriber receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Status(JobStatus),
    /// Nothing happened within the heartbeat interval.
    KeepAlive,
}

/// Ordered reader of one job's feed.
#[derive(Debug)]
pub struct Subscription {
    feed: Arc<Feed>,
    heartbeat: Duration,
    finished: bool,
}

impl Subscription {
    pub(crate) fn new(feed: Arc<Feed>, heartbeat: Duration) -> Self {
        Self {
            feed,
            heartbeat,
            finished: false,
        }
    }

    /// Next delivery, or `None` once the terminal status has been delivered.
    pub async fn recv(&mut self) -> Option<Delivery> {
        if self.finished {
            return None;
        }

        // Register for wakeups before looking at the state so a push in
        // between is not missed.
        let feed = Arc::clone(&self.feed);
        let notified = feed.notify.notified();
        if let Some(status) = self.take() {
            return Some(Delivery::Status(status));
        }

        match tokio::time::timeout(self.heartbeat, notified).await {
            Ok(()) => match self.take() {
                Some(status) => Some(Delivery::Status(status)),
                None => Some(Delivery::KeepAlive),
            },
            Err(_) => Some(Delivery::KeepAlive),
        }
    }

    fn take(&mut self) -> Option<JobStatus> {
        let mut state = self.feed.lock();
        let status = match state.pending.pop_front() {
            Some(status) => status,
            None => state.terminal.clone()?,
        };
        if status.is_terminal() {
            self.finished = true;
        }
        Some(status)
    }
}
