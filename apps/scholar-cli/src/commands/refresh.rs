//! Refresh commands: publish a job and stream its statuses as JSON lines.

use clap::Args;
use scholar_core::{JobId, Period, Pid, RefreshMarksRequest, RefreshStudentsRequest};
use scholar_jobs::{Delivery, JobPayload, JobQueue, JobStatus};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{CliError, CliResult};

/// Arguments for the refresh-students command
#[derive(Args)]
pub struct RefreshStudentsArgs {
    /// First pupil id to refresh
    #[arg(long)]
    pub start: i64,

    /// Number of consecutive pupil ids
    #[arg(long, default_value_t = 1)]
    pub count: u32,

    /// Delete pupils who no longer attend the school
    #[arg(long)]
    pub purge: bool,
}

/// Arguments for the refresh-marks command
#[derive(Args)]
pub struct RefreshMarksArgs {
    /// Pupil id
    #[arg(long)]
    pub pid: i64,

    /// First period, as YEAR[/TERM[/COLUMN]]
    #[arg(long)]
    pub from: Period,

    /// Last period, as YEAR[/TERM[/COLUMN]]
    #[arg(long)]
    pub to: Period,
}

/// One line of the status stream
#[derive(Serialize)]
struct StatusLine<'a> {
    job_id: JobId,
    #[serde(flatten)]
    status: &'a JobStatus,
}

pub async fn refresh_students(queue: &JobQueue, args: RefreshStudentsArgs) -> CliResult<()> {
    let payload = JobPayload::RefreshStudents(RefreshStudentsRequest {
        start_pid: Pid::new(args.start),
        n: args.count,
        purge: args.purge,
    });
    run_job(queue, payload).await
}

pub async fn refresh_marks(queue: &JobQueue, args: RefreshMarksArgs) -> CliResult<()> {
    let payload = JobPayload::RefreshMarks(RefreshMarksRequest {
        pid: Pid::new(args.pid),
        from: args.from,
        to: args.to,
    });
    run_job(queue, payload).await
}

/// Publish `payload` and follow the job to its terminal status.
///
/// The first Ctrl-C cancels the job; the stream then runs until the job
/// acknowledges it.
async fn run_job(queue: &JobQueue, payload: JobPayload) -> CliResult<()> {
    let job = queue.publish(payload)?;
    let mut subscription = queue.subscribe(job.id)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut cancel_requested = false;
    let mut terminal = None;

    loop {
        tokio::select! {
            delivery = subscription.recv() => match delivery {
                Some(Delivery::Status(status)) => {
                    let line = StatusLine { job_id: job.id, status: &status };
                    println!("{}", serde_json::to_string(&line)?);
                    if status.is_terminal() {
                        terminal = Some(status);
                    }
                }
                Some(Delivery::KeepAlive) => debug!(job_id = %job.id, "Job still running"),
                None => break,
            },
            signal = &mut ctrl_c, if !cancel_requested => {
                cancel_requested = true;
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    continue;
                }
                warn!(job_id = %job.id, "Received Ctrl+C, cancelling job");
                if let Err(e) = queue.cancel(job.id) {
                    debug!(job_id = %job.id, error = %e, "Job already finished");
                }
            }
        }
    }

    match terminal {
        Some(JobStatus::Failed { error }) => Err(CliError::JobFailed { id: job.id, error }),
        Some(JobStatus::Cancelled) => Err(CliError::JobCancelled(job.id)),
        _ => Ok(()),
    }
}
