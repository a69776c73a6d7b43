//! The seam between the reconciliation engine and Engage.

use async_trait::async_trait;
use scholar_core::{Pid, Subject};

use crate::envelope::RenderQuery;
use crate::error::EngageResult;

/// Operations the reconciliation engine needs from Engage.
///
/// Every method answers `EngageError::NotFound` when Engage returns no data
/// for the pupil.
#[async_trait]
pub trait EngageApi: Send + Sync {
    /// Academic years the pupil has marksheets for.
    async fn academic_years(&self, pid: Pid) -> EngageResult<Vec<i32>>;

    /// Reporting periods (terms) within `academic_years`.
    async fn reporting_periods(&self, pid: Pid, academic_years: &[i32])
        -> EngageResult<Vec<String>>;

    /// Subjects reported within the given years and periods.
    async fn reporting_subjects(
        &self,
        pid: Pid,
        academic_years: &[i32],
        reporting_periods: &[String],
    ) -> EngageResult<Vec<Subject>>;

    /// Marksheet columns (exam types) for the given subjects.
    async fn columns_for_subjects(
        &self,
        pid: Pid,
        academic_years: &[i32],
        reporting_periods: &[String],
        subjects: &[Subject],
    ) -> EngageResult<Vec<String>>;

    /// Raw marksheet render.
    async fn marksheet_render(&self, pid: Pid, query: &RenderQuery) -> EngageResult<String>;
}
