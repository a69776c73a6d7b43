//! Asynchronous refresh jobs for scholar.
//!
//! [`JobQueue::publish`] starts a refresh on its own task and hands back the
//! job id; [`JobQueue::subscribe`] streams that job's [`JobStatus`] events,
//! with keep-alives while the job is quiet; [`JobQueue::cancel`] asks it to
//! stop at its next checkpoint.

pub mod config;
pub mod executor;
pub mod feed;
pub mod job;
pub mod queue;

pub use config::JobQueueConfig;
pub use executor::{JobExecutor, ServiceExecutor};
pub use feed::{Delivery, Subscription};
pub use job::{Job, JobPayload, JobStatus};
pub use queue::JobQueue;
