//! Store-backed mark service.
//!
//! Full periods are closed grading columns and may be filled in from Engage.
//! Partial periods are answered from the local store only, since Engage data
//! for an open period is incomplete and expensive to fetch.

use async_trait::async_trait;
use scholar_core::{
    Mark, MarkService, MarksFilter, Period, PeriodService, Pid, RefreshContext,
    RefreshMarksRequest, RefreshSummary, Result, ScholarError,
};
use scholar_db::{DbError, DbPool, DbResult, MarkRow, StudentRow, SubjectRow};
use scholar_engage::{EngageApi, Pacer};
use sqlx::SqliteConnection;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::SyncConfig;
use crate::diff::new_marks;
use crate::upstream::fetch_period_marks;

/// [`MarkService`] over the local store, reconciled against Engage.
#[derive(Clone)]
pub struct DbMarkService {
    pool: DbPool,
    engage: Arc<dyn EngageApi>,
    periods: Arc<dyn PeriodService>,
    config: SyncConfig,
    pacer: Pacer,
}

impl DbMarkService {
    pub fn new(
        pool: DbPool,
        engage: Arc<dyn EngageApi>,
        periods: Arc<dyn PeriodService>,
        config: SyncConfig,
    ) -> Self {
        let pacer = Pacer::new(config.pacing_interval);
        Self {
            pool,
            engage,
            periods,
            config,
            pacer,
        }
    }

    /// `NotFound` unless the student is stored locally.
    async fn ensure_student(&self, pid: Pid) -> Result<()> {
        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        StudentRow::find_by_pid(&mut conn, pid).await?;
        Ok(())
    }

    /// Local marks of `pid` in the given periods.
    async fn local_marks(&self, pid: Pid, periods: Vec<Period>) -> Result<Vec<Mark>> {
        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        StudentRow::find_by_pid(&mut conn, pid).await?;
        if periods.is_empty() {
            return Ok(Vec::new());
        }
        Ok(MarkRow::find(&mut conn, &MarksFilter::by_pid(pid).with_periods(periods)).await?)
    }

    /// Fetch one full period from Engage and store the marks missing locally,
    /// in a single transaction. Returns how many marks were stored.
    async fn sync_period(&self, pid: Pid, period: &Period) -> Result<u32> {
        let upstream =
            fetch_period_marks(self.engage.as_ref(), self.periods.as_ref(), pid, period).await?;

        let mut tx = self.pool.begin().await?;
        let created = persist_new_marks(&mut tx, pid, period, &upstream)
            .await
            .map_err(|e| {
                ScholarError::from(e).context(format!("store marks of {pid} in {period}"))
            })?;
        tx.commit().await.map_err(DbError::from)?;

        debug!(pid = %pid, period = %period, created, "Synced period marks");
        Ok(created)
    }
}

/// Store the upstream marks whose subject has no local mark in `period`.
async fn persist_new_marks(
    conn: &mut SqliteConnection,
    pid: Pid,
    period: &Period,
    upstream: &[Mark],
) -> DbResult<u32> {
    StudentRow::find_by_pid(conn, pid).await?;
    let filter = MarksFilter::by_pid(pid).with_periods(vec![period.clone()]);
    let local = MarkRow::find(conn, &filter).await?;

    let mut created = 0;
    for mark in new_marks(&local, upstream) {
        let subject = SubjectRow::find_by_name(conn, &mark.subject.name).await?;
        let mark = Mark {
            subject,
            ..mark.clone()
        };
        MarkRow::create(conn, &mark).await?;
        created += 1;
    }
    Ok(created)
}

#[async_trait]
impl MarkService for DbMarkService {
    async fn find_mark_by_id(&self, id: i64) -> Result<Mark> {
        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        Ok(MarkRow::find_by_id(&mut conn, id).await?)
    }

    async fn find_marks_by_pid(&self, pid: Pid) -> Result<Vec<Mark>> {
        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        StudentRow::find_by_pid(&mut conn, pid).await?;
        Ok(MarkRow::find(&mut conn, &MarksFilter::by_pid(pid)).await?)
    }

    #[instrument(skip_all, fields(pid = %pid, period = %period))]
    async fn find_marks_by_period(&self, pid: Pid, period: &Period) -> Result<Vec<Mark>> {
        if !period.is_full() {
            let mut marks = self
                .local_marks(
                    pid,
                    self.periods
                        .build_periods(pid, period.academic_year, period.term)
                        .await?,
                )
                .await?;
            marks.retain(|m| period.contains(&m.period));
            return Ok(marks);
        }

        if self.config.mark_fallback {
            self.ensure_student(pid).await?;
            self.sync_period(pid, period).await?;
        }
        self.local_marks(pid, vec![period.clone()]).await
    }

    async fn find_marks_by_period_range(
        &self,
        from: &Period,
        to: &Period,
        mut filter: MarksFilter,
    ) -> Result<Vec<Mark>> {
        let Some(pid) = filter.pid else {
            return Err(ScholarError::invalid(
                "cannot find marks over a period range without a student id",
            ));
        };
        if let Some(id) = filter.id {
            return Ok(vec![self.find_mark_by_id(id).await?]);
        }

        filter.periods = self.periods.period_range(pid, from, to).await?;
        if filter.periods.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        Ok(MarkRow::find(&mut conn, &filter).await?)
    }

    async fn find_marks(&self, filter: &MarksFilter) -> Result<Vec<Mark>> {
        let mut conn = self.pool.inner().acquire().await.map_err(DbError::from)?;
        Ok(MarkRow::find(&mut conn, filter).await?)
    }

    #[instrument(skip(self))]
    async fn delete_mark(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        MarkRow::delete(&mut tx, id).await?;
        tx.commit().await.map_err(DbError::from)?;
        info!(id, "Deleted mark");
        Ok(())
    }

    #[instrument(
        skip_all,
        fields(pid = %request.pid, from = %request.from, to = %request.to)
    )]
    async fn refresh_marks(
        &self,
        request: &RefreshMarksRequest,
        ctx: &RefreshContext,
    ) -> Result<RefreshSummary> {
        let pid = request.pid;
        self.ensure_student(pid)
            .await
            .map_err(|e| e.context("refresh marks"))?;

        let periods = self
            .periods
            .period_range(pid, &request.from, &request.to)
            .await?;

        let mut summary = RefreshSummary::default();
        for (i, period) in periods.iter().enumerate() {
            if i > 0 {
                self.pacer
                    .pace(ctx.cancel_token())
                    .await
                    .map_err(|_| ScholarError::cancelled("refresh marks"))?;
            } else if ctx.is_cancelled() {
                return Err(ScholarError::cancelled("refresh marks"));
            }

            let created = self.sync_period(pid, period).await?;
            if created == 0 {
                summary.unchanged += 1;
            }
            summary.created += created;

            info!(pid = %pid, period = %period, created, "Refreshed period marks");
            ctx.report(format!("{period}: {created} new marks"));
        }

        info!(%summary, "Mark refresh finished");
        Ok(summary)
    }
}
