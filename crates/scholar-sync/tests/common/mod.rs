//! In-process Engage stand-in and service wiring for reconciliation tests.

#![allow(dead_code)]

use async_trait::async_trait;
use scholar_core::{CalendarPeriodService, ErrorKind, Period, Pid, Subject, Term};
use scholar_db::{run_migrations, DbPool};
use scholar_engage::{EngageApi, EngageError, EngageResult, RenderQuery};
use scholar_sync::{DbMarkService, DbStudentService, SyncConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CURRENT_YEAR: i32 = 2023;

const REPORTING_PERIODS: [Term; 3] = Term::ALL;
const COLUMNS: [&str; 2] = ["Test", "Exam"];

#[derive(Debug, Clone)]
pub struct StubMark {
    pub period: Period,
    pub subject: String,
    pub teacher: String,
    pub percentage: u8,
}

#[derive(Debug, Clone)]
pub struct StubPupil {
    pub name: String,
    pub academic_years: Vec<i32>,
    pub year_in_program: i32,
    pub subjects: Vec<Subject>,
    pub marks: Vec<StubMark>,
}

impl StubPupil {
    /// A pupil attending in the current academic year.
    pub fn attending(name: &str, year_in_program: i32) -> Self {
        Self {
            name: name.to_string(),
            academic_years: vec![CURRENT_YEAR - 1, CURRENT_YEAR],
            year_in_program,
            subjects: vec![
                Subject::upstream("MA", "Mathematics"),
                Subject::upstream("PH", "Physics"),
            ],
            marks: Vec::new(),
        }
    }

    /// A pupil who left before the current academic year.
    pub fn left(name: &str) -> Self {
        Self {
            academic_years: vec![CURRENT_YEAR - 2],
            ..Self::attending(name, 12)
        }
    }

    pub fn with_mark(mut self, period: Period, subject: &str, teacher: &str, percentage: u8) -> Self {
        self.marks.push(StubMark {
            period,
            subject: subject.to_string(),
            teacher: teacher.to_string(),
            percentage,
        });
        self
    }
}

/// Engage stand-in backed by a pupil table.
///
/// Like the real service, it answers an unknown pupil (or a render with
/// nothing in it) with no data, which surfaces as `EngageError::NotFound`.
#[derive(Default)]
pub struct StubEngage {
    pupils: Mutex<HashMap<Pid, StubPupil>>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl StubEngage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, pid: i64, pupil: StubPupil) {
        self.pupils.lock().unwrap().insert(Pid::new(pid), pupil);
    }

    pub fn remove(&self, pid: i64) {
        self.pupils.lock().unwrap().remove(&Pid::new(pid));
    }

    pub fn update(&self, pid: i64, f: impl FnOnce(&mut StubPupil)) {
        let mut pupils = self.pupils.lock().unwrap();
        f(pupils.get_mut(&Pid::new(pid)).unwrap());
    }

    /// Upstream calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with an HTTP 500.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn pupil(&self, pid: Pid) -> EngageResult<StubPupil> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngageError::Status {
                kind: ErrorKind::Internal,
                status: 500,
                detail: "error body empty".to_string(),
            });
        }
        self.pupils
            .lock()
            .unwrap()
            .get(&pid)
            .cloned()
            .ok_or_else(|| EngageError::NotFound {
                pid: pid.to_string(),
            })
    }
}

fn row(mark: &StubMark) -> String {
    format!(
        "<tr><td>\t{}, {}, {}</td></tr>",
        mark.percentage, mark.subject, mark.teacher
    )
}

#[async_trait]
impl EngageApi for StubEngage {
    async fn academic_years(&self, pid: Pid) -> EngageResult<Vec<i32>> {
        Ok(self.pupil(pid)?.academic_years)
    }

    async fn reporting_periods(
        &self,
        pid: Pid,
        _academic_years: &[i32],
    ) -> EngageResult<Vec<String>> {
        self.pupil(pid)?;
        Ok(REPORTING_PERIODS
            .iter()
            .map(|term| term.engage_label().to_string())
            .collect())
    }

    async fn reporting_subjects(
        &self,
        pid: Pid,
        _academic_years: &[i32],
        _reporting_periods: &[String],
    ) -> EngageResult<Vec<Subject>> {
        Ok(self.pupil(pid)?.subjects)
    }

    async fn columns_for_subjects(
        &self,
        pid: Pid,
        _academic_years: &[i32],
        _reporting_periods: &[String],
        _subjects: &[Subject],
    ) -> EngageResult<Vec<String>> {
        self.pupil(pid)?;
        Ok(COLUMNS.iter().map(|c| (*c).to_string()).collect())
    }

    async fn marksheet_render(&self, pid: Pid, query: &RenderQuery) -> EngageResult<String> {
        let pupil = self.pupil(pid)?;

        if !query.subjects.is_empty() {
            return Ok(format!(
                "<div class=\"header\"><a>{}</a><span>Year {}</span></div>",
                pupil.name, pupil.year_in_program
            ));
        }

        let render: String = pupil
            .marks
            .iter()
            .filter(|m| {
                query.academic_years.contains(&m.period.academic_year)
                    && m.period.term.is_some_and(|term| {
                        query
                            .reporting_periods
                            .iter()
                            .any(|p| p == term.engage_label())
                    })
                    && m.period
                        .importance
                        .as_ref()
                        .is_some_and(|i| query.columns.contains(i))
            })
            .map(row)
            .collect();

        if render.is_empty() {
            return Err(EngageError::NotFound {
                pid: pid.to_string(),
            });
        }
        Ok(format!("<table>{render}</table>"))
    }
}

pub struct Harness {
    pub engage: Arc<StubEngage>,
    pub pool: DbPool,
    pub students: DbStudentService,
    pub marks: DbMarkService,
}

pub fn test_config() -> SyncConfig {
    SyncConfig {
        pacing_interval: Duration::from_millis(1),
        student_fallback: true,
        mark_fallback: true,
        current_academic_year: CURRENT_YEAR,
    }
}

pub async fn harness() -> Harness {
    harness_with(test_config()).await
}

pub async fn harness_with(config: SyncConfig) -> Harness {
    let pool = DbPool::in_memory().await.unwrap();
    run_migrations(&pool).await.unwrap();

    let engage = StubEngage::new();
    let students = DbStudentService::new(pool.clone(), engage.clone(), config.clone());
    let marks = DbMarkService::new(
        pool.clone(),
        engage.clone(),
        Arc::new(CalendarPeriodService::default()),
        config,
    );

    Harness {
        engage,
        pool,
        students,
        marks,
    }
}
