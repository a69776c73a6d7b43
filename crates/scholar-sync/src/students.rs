//! Store-backed student service.

use async_trait::async_trait;
use scholar_core::{
    MarksFilter, Pid, RefreshContext, RefreshStudentsRequest, RefreshSummary, Result,
    ScholarError, Student, StudentFilter, StudentService,
};
use scholar_db::{DbError, DbPool, MarkRow, StudentRow};
use scholar_engage::{EngageApi, Pacer};
use sqlx::SqliteConnection;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::config::SyncConfig;
use crate::upstream::fetch_student;

/// What reconciling one pupil did to the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentAction {
    /// Neither side knows the pupil.
    Absent,
    /// Only the local copy exists; it is kept.
    Kept,
    Created,
    Updated,
    Unchanged,
    /// Not attending and not stored; purge skipped it.
    Skipped,
    /// No longer attending; purge deleted it.
    Deleted,
}

impl StudentAction {
    fn record(self, summary: &mut RefreshSummary) {
        match self {
            StudentAction::Created => summary.created += 1,
            StudentAction::Updated => summary.updated += 1,
            StudentAction::Deleted => summary.deleted += 1,
            StudentAction::Skipped => summary.skipped += 1,
            StudentAction::Absent | StudentAction::Kept | StudentAction::Unchanged => {
                summary.unchanged += 1;
            }
        }
    }
}

impl fmt::Display for StudentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StudentAction::Absent => "absent",
            StudentAction::Kept => "kept",
            StudentAction::Created => "created",
            StudentAction::Updated => "updated",
            StudentAction::Unchanged => "unchanged",
            StudentAction::Skipped => "skipped",
            StudentAction::Deleted => "deleted",
        })
    }
}

/// [`StudentService`] over the local store, reconciled against Engage.
#[derive(Clone)]
pub struct DbStudentService {
    pool: DbPool,
    engage: Arc<dyn EngageApi>,
    config: SyncConfig,
    pacer: Pacer,
}

impl DbStudentService {
    pub fn new(pool: DbPool, engage: Arc<dyn EngageApi>, config: SyncConfig) -> Self {
        let pacer = Pacer::new(config.pacing_interval);
        Self {
            pool,
            engage,
            config,
            pacer,
        }
    }

    async fn attach_marks(conn: &mut SqliteConnection, student: &mut Student) -> Result<()> {
        student.marks = MarkRow::find(conn, &MarksFilter::by_pid(student.pid))
            .await
            .map_err(|e| ScholarError::from(e).context("attach student marks"))?;
        Ok(())
    }

    /// Apply the reconciliation table to one pupil.
    async fn reconcile(&self, pid: Pid, purge: bool) -> Result<StudentAction> {
        let fetched =
            fetch_student(self.engage.as_ref(), pid, self.config.current_academic_year).await;
        let upstream = match fetched {
            Ok(student) => Some(student),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                warn!(pid = %pid, error = %e, "Engage lookup failed");
                return Err(ScholarError::from(e).context(format!("refresh student {pid}")));
            }
        };

        let mut tx = self.pool.begin().await?;
        let local = StudentRow::find_optional(&mut tx, pid).await?;

        let action = match (upstream, local) {
            (None, None) => StudentAction::Absent,
            (None, Some(_)) => StudentAction::Kept,
            (Some(up), None) if purge && !up.attends_school => StudentAction::Skipped,
            (Some(up), None) => {
                StudentRow::create(&mut tx, &up).await?;
                StudentAction::Created
            }
            (Some(up), Some(_)) if purge && !up.attends_school => {
                StudentRow::delete(&mut tx, pid).await?;
                StudentAction::Deleted
            }
            (Some(up), Some(local)) => {
                if StudentRow::update(&mut tx, &local, &up).await? {
                    StudentAction::Updated
                } else {
                    StudentAction::Unchanged
                }
            }
        };

        tx.commit().await.map_err(DbError::from)?;
        Ok(action)
    }
}

#[async_trait]
impl StudentService for DbStudentService {
    #[instrument(skip_all, fields(pid = %pid))]
    async fn find_student_by_pid(&self, pid: Pid) -> Result<Student> {
        {
            let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
            if let Some(mut student) = StudentRow::find_optional(&mut conn, pid).await? {
                Self::attach_marks(&mut conn, &mut student).await?;
                return Ok(student);
            }
        }

        let student = fetch_student(self.engage.as_ref(), pid, self.config.current_academic_year)
            .await
            .map_err(|e| ScholarError::from(e).context(format!("find student {pid}")))?;
        if !self.config.student_fallback {
            return Ok(student);
        }

        let mut tx = self.pool.begin().await?;
        let created = StudentRow::create(&mut tx, &student).await?;
        tx.commit().await.map_err(DbError::from)?;
        info!(pid = %pid, "Stored student fetched from Engage");
        Ok(created)
    }

    async fn find_students(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        let mut students = StudentRow::find(&mut conn, filter).await?;
        for student in &mut students {
            Self::attach_marks(&mut conn, student).await?;
        }
        Ok(students)
    }

    #[instrument(skip_all, fields(pid = %pid))]
    async fn delete_student(&self, pid: Pid) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        StudentRow::delete(&mut tx, pid).await?;
        tx.commit().await.map_err(DbError::from)?;
        info!(pid = %pid, "Deleted student");
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(start_pid = %request.start_pid, n = request.n, purge = request.purge)
    )]
    async fn refresh_students(
        &self,
        request: &RefreshStudentsRequest,
        ctx: &RefreshContext,
    ) -> Result<RefreshSummary> {
        let pids = request.pids()?;
        let mut summary = RefreshSummary::default();

        for (i, pid) in pids.enumerate() {
            if i > 0 {
                self.pacer
                    .pace(ctx.cancel_token())
                    .await
                    .map_err(|_| ScholarError::cancelled("refresh students"))?;
            } else if ctx.is_cancelled() {
                return Err(ScholarError::cancelled("refresh students"));
            }

            let action = self.reconcile(pid, request.purge).await?;
            action.record(&mut summary);
            info!(pid = %pid, %action, "Reconciled student");
            ctx.report(format!("pid {pid}: {action}"));
        }

        info!(%summary, "Student refresh finished");
        Ok(summary)
    }
}
