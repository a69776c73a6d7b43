//! Ranking reports.
//!
//! Only the interface exists; [`UnimplementedRanking`] answers every call
//! with `NotImplemented`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScholarError};
use crate::ids::Pid;
use crate::models::{Period, Subject};

/// Selects the students and marks a ranking is computed over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingFilter {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    pub period: Option<Period>,
}

/// A snapshot of one pupil's average over some subjects and a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    pub id: i64,
    pub score: u8,
    /// Set when the rank was produced by a cohort report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub pid: Pid,
    pub subjects: Vec<Subject>,
    pub period: Period,
    pub generated_at: DateTime<Utc>,
}

#[async_trait]
pub trait RankingService: Send + Sync {
    /// Rank every student matching `filter` against each other.
    async fn generate_rankings_report(&self, filter: &RankingFilter) -> Result<Vec<Rank>>;

    /// Past ranks of one pupil for the same period and subjects, newest first.
    async fn view_evolution(
        &self,
        pid: Pid,
        offset: u32,
        period: &Period,
        subjects: &[Subject],
    ) -> Result<Vec<Rank>>;

    async fn create_backup_rank(
        &self,
        pid: Pid,
        period: &Period,
        subjects: &[Subject],
    ) -> Result<Rank>;

    async fn delete_rank(&self, id: i64) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnimplementedRanking;

fn not_implemented<T>(operation: &str) -> Result<T> {
    Err(ScholarError::not_implemented(format!(
        "ranking: {operation} is not implemented"
    )))
}

#[async_trait]
impl RankingService for UnimplementedRanking {
    async fn generate_rankings_report(&self, _filter: &RankingFilter) -> Result<Vec<Rank>> {
        not_implemented("generate rankings report")
    }

    async fn view_evolution(
        &self,
        _pid: Pid,
        _offset: u32,
        _period: &Period,
        _subjects: &[Subject],
    ) -> Result<Vec<Rank>> {
        not_implemented("view evolution")
    }

    async fn create_backup_rank(
        &self,
        _pid: Pid,
        _period: &Period,
        _subjects: &[Subject],
    ) -> Result<Rank> {
        not_implemented("create backup rank")
    }

    async fn delete_rank(&self, _id: i64) -> Result<()> {
        not_implemented("delete rank")
    }
}
