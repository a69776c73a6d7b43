//! Composition root: opens the store and wires services and the job queue.

use scholar_core::CalendarPeriodService;
use scholar_db::{run_migrations, DbPool};
use scholar_engage::{EngageApi, EngageClient};
use scholar_jobs::{JobQueue, ServiceExecutor};
use scholar_sync::{DbMarkService, DbStudentService};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::error::CliResult;

pub struct App {
    pub pool: DbPool,
    pub students: Arc<DbStudentService>,
    pub marks: Arc<DbMarkService>,
    pub queue: JobQueue,
}

impl App {
    pub async fn build(config: &AppConfig) -> CliResult<Self> {
        let pool = DbPool::connect(&config.database_url).await?;
        run_migrations(&pool).await?;

        let engage: Arc<dyn EngageApi> = Arc::new(EngageClient::new(&config.engage)?);
        let periods = Arc::new(CalendarPeriodService::new(config.importances.clone()));

        let students = Arc::new(DbStudentService::new(
            pool.clone(),
            engage.clone(),
            config.sync.clone(),
        ));
        let marks = Arc::new(DbMarkService::new(
            pool.clone(),
            engage,
            periods,
            config.sync.clone(),
        ));

        let executor = ServiceExecutor::new(students.clone(), marks.clone());
        let queue = JobQueue::new(Arc::new(executor), config.jobs.clone());

        info!(
            academic_year = config.sync.current_academic_year,
            pacing_ms = config.sync.pacing_interval.as_millis() as u64,
            "Services ready"
        );
        Ok(Self {
            pool,
            students,
            marks,
            queue,
        })
    }

    pub async fn shutdown(&self) -> CliResult<()> {
        self.queue.close().await?;
        self.pool.close().await;
        Ok(())
    }
}
