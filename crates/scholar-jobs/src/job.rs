//! Jobs and the statuses they emit.

use scholar_core::{
    JobId, RefreshMarksRequest, RefreshStudentsRequest, RefreshSummary, ScholarError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Work a job performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobPayload {
    RefreshStudents(RefreshStudentsRequest),
    RefreshMarks(RefreshMarksRequest),
}

impl JobPayload {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            JobPayload::RefreshStudents(_) => "refresh_students",
            JobPayload::RefreshMarks(_) => "refresh_marks",
        }
    }
}

impl fmt::Display for JobPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobPayload::RefreshStudents(r) => write!(
                f,
                "refresh {} students from pid {}{}",
                r.n,
                r.start_pid,
                if r.purge { " with purge" } else { "" }
            ),
            JobPayload::RefreshMarks(r) => {
                write!(f, "refresh marks of pid {} from {} to {}", r.pid, r.from, r.to)
            }
        }
    }
}

/// A published job.
///
/// The cancellation token stays with the queue; cancel through
/// [`crate::JobQueue::cancel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub payload: JobPayload,
}

/// A progress event of one job.
///
/// A job emits `Queued`, any number of `Running`, then exactly one of the
/// terminal statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running { detail: String },
    Done { summary: RefreshSummary },
    Cancelled,
    Failed { error: ScholarError },
}

impl JobStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done { .. } | JobStatus::Cancelled | JobStatus::Failed { .. }
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running { .. } => "running",
            JobStatus::Done { .. } => "done",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Failed { .. } => "failed",
        }
    }
}
