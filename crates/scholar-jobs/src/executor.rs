//! The seam between the job queue and the services that do the work.

use async_trait::async_trait;
use scholar_core::{MarkService, RefreshContext, RefreshSummary, Result, StudentService};
use std::sync::Arc;

use crate::job::JobPayload;

/// Runs the payload of a job.
///
/// Implementations observe `ctx`'s cancellation token at their checkpoints
/// and report progress through it.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    async fn execute(&self, payload: &JobPayload, ctx: &RefreshContext) -> Result<RefreshSummary>;
}

/// Executor dispatching refresh payloads to the reconciliation services.
#[derive(Clone)]
pub struct ServiceExecutor {
    students: Arc<dyn StudentService>,
    marks: Arc<dyn MarkService>,
}

impl ServiceExecutor {
    pub fn new(students: Arc<dyn StudentService>, marks: Arc<dyn MarkService>) -> Self {
        Self { students, marks }
    }
}

#[async_trait]
impl JobExecutor for ServiceExecutor {
    async fn execute(&self, payload: &JobPayload, ctx: &RefreshContext) -> Result<RefreshSummary> {
        match payload {
            JobPayload::RefreshStudents(request) => {
                self.students.refresh_students(request, ctx).await
            }
            JobPayload::RefreshMarks(request) => self.marks.refresh_marks(request, ctx).await,
        }
    }
}
