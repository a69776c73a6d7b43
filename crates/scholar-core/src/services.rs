//! Capability traits for the student, mark and period services.
//!
//! The reconciliation engine provides store-backed implementations; tests
//! and the job queue depend only on these traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::ids::Pid;
use crate::models::{Mark, MarksFilter, Period, Student, StudentFilter, Term};
use crate::refresh::{RefreshContext, RefreshMarksRequest, RefreshStudentsRequest, RefreshSummary};

/// Student lookup, removal and refresh.
#[async_trait]
pub trait StudentService: Send + Sync {
    /// Find a student by pupil id, with subjects and marks attached.
    ///
    /// Falls back on upstream when the student is not stored locally;
    /// returns `NotFound` when neither side knows the pid.
    async fn find_student_by_pid(&self, pid: Pid) -> Result<Student>;

    /// Find stored students matching `filter`.
    async fn find_students(&self, filter: &StudentFilter) -> Result<Vec<Student>>;

    /// Permanently delete a stored student. `NotFound` if absent.
    async fn delete_student(&self, pid: Pid) -> Result<()>;

    /// Reconcile a run of consecutive pupils with upstream.
    async fn refresh_students(
        &self,
        request: &RefreshStudentsRequest,
        ctx: &RefreshContext,
    ) -> Result<RefreshSummary>;
}

/// Mark lookup, removal and refresh.
#[async_trait]
pub trait MarkService: Send + Sync {
    /// `NotFound` if no mark has this id.
    async fn find_mark_by_id(&self, id: i64) -> Result<Mark>;

    /// Stored marks of one pupil. Never consults upstream.
    async fn find_marks_by_pid(&self, pid: Pid) -> Result<Vec<Mark>>;

    /// Marks of one pupil in `period`.
    ///
    /// Only full periods may consult upstream; partial periods are answered
    /// from local storage.
    async fn find_marks_by_period(&self, pid: Pid, period: &Period) -> Result<Vec<Mark>>;

    /// Stored marks between two periods. `filter.pid` is required.
    async fn find_marks_by_period_range(
        &self,
        from: &Period,
        to: &Period,
        filter: MarksFilter,
    ) -> Result<Vec<Mark>>;

    async fn find_marks(&self, filter: &MarksFilter) -> Result<Vec<Mark>>;

    /// Permanently delete a mark. `NotFound` if absent.
    async fn delete_mark(&self, id: i64) -> Result<()>;

    /// Append upstream marks missing locally over a period range.
    async fn refresh_marks(
        &self,
        request: &RefreshMarksRequest,
        ctx: &RefreshContext,
    ) -> Result<RefreshSummary>;
}

/// Knowledge of a pupil's grading calendar.
#[async_trait]
pub trait PeriodService: Send + Sync {
    /// Expand a year, or one term of it, into its full periods.
    async fn build_periods(&self, pid: Pid, year: i32, term: Option<Term>) -> Result<Vec<Period>>;

    /// Full periods between `from` and `to`, inclusive and in order.
    async fn period_range(&self, pid: Pid, from: &Period, to: &Period) -> Result<Vec<Period>>;

    /// Upstream reporting-period label for `period`.
    async fn period_to_engage_term(&self, pid: Pid, period: &Period) -> Result<String>;
}
