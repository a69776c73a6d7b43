//! Job queue.
//!
//! Every published job runs on its own task. The queue owns one table, behind
//! a single mutex, holding the cancellation token of every live job and the
//! feed of every live or recently finished job. Publishing, cancelling and
//! completing a job all mutate that table under the lock, so a job's terminal
//! status is decided atomically with respect to [`JobQueue::cancel`].

use scholar_core::{JobId, RefreshContext, RefreshSummary, Result, ScholarError};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, instrument, warn};

use crate::config::JobQueueConfig;
use crate::executor::JobExecutor;
use crate::feed::{Feed, Subscription};
use crate::job::{Job, JobPayload, JobStatus};

#[derive(Default)]
struct QueueState {
    closed: bool,
    next_id: i64,
    cancels: HashMap<JobId, CancellationToken>,
    feeds: HashMap<JobId, Arc<Feed>>,
    /// Finished jobs, oldest first, whose feeds are still kept.
    finished: VecDeque<JobId>,
}

struct Shared {
    state: Mutex<QueueState>,
    config: JobQueueConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Decide and emit the terminal status of a job.
    fn finish(
        &self,
        id: JobId,
        token: &CancellationToken,
        feed: &Feed,
        outcome: Result<RefreshSummary>,
    ) -> JobStatus {
        let mut state = self.lock();
        state.cancels.remove(&id);

        let status = if token.is_cancelled() {
            JobStatus::Cancelled
        } else {
            match outcome {
                Ok(summary) => JobStatus::Done { summary },
                Err(error) => JobStatus::Failed { error },
            }
        };
        feed.push(status.clone());

        state.finished.push_back(id);
        while state.finished.len() > self.config.finished_retention {
            if let Some(evicted) = state.finished.pop_front() {
                state.feeds.remove(&evicted);
            }
        }
        status
    }
}

/// Asynchronous refresh job queue.
#[derive(Clone)]
pub struct JobQueue {
    shared: Arc<Shared>,
    executor: Arc<dyn JobExecutor>,
    tracker: TaskTracker,
}

impl JobQueue {
    pub fn new(executor: Arc<dyn JobExecutor>, config: JobQueueConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    next_id: 1,
                    ..QueueState::default()
                }),
                config,
            }),
            executor,
            tracker: TaskTracker::new(),
        }
    }

    /// Register and start a job. Returns as soon as the job is spawned.
    ///
    /// The job is handed to the tracker before the table lock is released,
    /// so a concurrent [`JobQueue::close`] either rejects it or waits for it.
    #[instrument(skip_all, fields(kind = payload.kind()))]
    pub fn publish(&self, payload: JobPayload) -> Result<Job> {
        let token = CancellationToken::new();
        let feed = Arc::new(Feed::default());

        let job = {
            let mut state = self.shared.lock();
            if state.closed {
                return Err(ScholarError::internal("job queue is closed"));
            }
            let id = JobId::from_raw(state.next_id);
            state.next_id += 1;
            state.cancels.insert(id, token.clone());
            state.feeds.insert(id, feed.clone());
            feed.push(JobStatus::Queued);
            let job = Job { id, payload };

            let shared = self.shared.clone();
            let executor = self.executor.clone();
            let running = job.clone();
            self.tracker.spawn(async move {
                run_job(shared, executor, running, token, feed).await;
            });
            job
        };

        info!(job_id = %job.id, payload = %job.payload, "Job published");
        Ok(job)
    }

    /// Attach to a job's status feed.
    pub fn subscribe(&self, id: JobId) -> Result<Subscription> {
        let state = self.shared.lock();
        if state.closed {
            return Err(ScholarError::internal("job queue is closed"));
        }
        let feed = state
            .feeds
            .get(&id)
            .cloned()
            .ok_or_else(|| ScholarError::not_found(format!("job {id} not found")))?;
        Ok(Subscription::new(feed, self.shared.config.heartbeat_interval))
    }

    /// Request cancellation of a live job.
    ///
    /// `NotFound` when the job is unknown or already finished.
    pub fn cancel(&self, id: JobId) -> Result<()> {
        let token = self
            .shared
            .lock()
            .cancels
            .remove(&id)
            .ok_or_else(|| ScholarError::not_found(format!("job {id} not found or finished")))?;
        token.cancel();
        info!(job_id = %id, "Job cancellation requested");
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Stop accepting jobs and wait for the running ones to finish.
    pub async fn close(&self) -> Result<()> {
        {
            let mut state = self.shared.lock();
            if state.closed {
                return Ok(());
            }
            state.closed = true;
        }

        self.tracker.close();
        info!(in_flight = self.tracker.len(), "Closing job queue");
        self.tracker.wait().await;
        info!("Job queue closed");
        Ok(())
    }
}

async fn run_job(
    shared: Arc<Shared>,
    executor: Arc<dyn JobExecutor>,
    job: Job,
    token: CancellationToken,
    feed: Arc<Feed>,
) {
    feed.push(JobStatus::Running {
        detail: job.payload.to_string(),
    });

    let sink = feed.clone();
    let ctx = RefreshContext::new(token.clone()).with_progress(Arc::new(move |detail: String| {
        sink.push(JobStatus::Running { detail });
    }));

    // A panicking executor still has to produce a terminal status.
    let payload = job.payload.clone();
    let outcome = match tokio::spawn(async move { executor.execute(&payload, &ctx).await }).await {
        Ok(outcome) => outcome,
        Err(e) => Err(ScholarError::internal(format!("job {} aborted: {e}", job.id))),
    };

    match shared.finish(job.id, &token, &feed, outcome) {
        JobStatus::Failed { error } => {
            warn!(job_id = %job.id, error = %error, "Job failed");
        }
        status => info!(job_id = %job.id, status = status.as_str(), "Job finished"),
    }
}
