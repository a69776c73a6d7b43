//! Fixed school calendar.
//!
//! Every academic year has the three [`Term`]s, and every term carries the
//! same configured list of marksheet columns ("importances"). Full periods
//! are ordered by year, then term, then the column's position in that list.

use async_trait::async_trait;

use crate::error::{Result, ScholarError};
use crate::ids::Pid;
use crate::models::{Period, Term};
use crate::services::PeriodService;

/// Columns used when none are configured.
pub const DEFAULT_IMPORTANCES: [&str; 2] = ["Test", "Exam"];

/// [`PeriodService`] over a calendar shared by every pupil.
#[derive(Debug, Clone)]
pub struct CalendarPeriodService {
    importances: Vec<String>,
}

impl Default for CalendarPeriodService {
    fn default() -> Self {
        Self::new(DEFAULT_IMPORTANCES.iter().map(|s| (*s).to_string()).collect())
    }
}

impl CalendarPeriodService {
    #[must_use]
    pub fn new(importances: Vec<String>) -> Self {
        Self { importances }
    }

    #[must_use]
    pub fn importances(&self) -> &[String] {
        &self.importances
    }

    fn importance_position(&self, period: &Period) -> Result<Option<usize>> {
        match &period.importance {
            None => Ok(None),
            Some(importance) => self
                .importances
                .iter()
                .position(|i| i == importance)
                .map(Some)
                .ok_or_else(|| {
                    ScholarError::invalid(format!("unknown importance {importance:?} in {period}"))
                }),
        }
    }

    /// Sort key of the first full period inside `period`.
    fn lower_key(&self, period: &Period) -> Result<(i32, Term, usize)> {
        let position = self.importance_position(period)?.unwrap_or(0);
        Ok((
            period.academic_year,
            period.term.unwrap_or(Term::Autumn),
            position,
        ))
    }

    /// Sort key of the last full period inside `period`.
    fn upper_key(&self, period: &Period) -> Result<(i32, Term, usize)> {
        let last = self.importances.len().saturating_sub(1);
        let position = self.importance_position(period)?.unwrap_or(last);
        Ok((
            period.academic_year,
            period.term.unwrap_or(Term::Summer),
            position,
        ))
    }

    fn full_periods_of(&self, academic_year: i32, terms: &[Term]) -> Vec<Period> {
        terms
            .iter()
            .flat_map(|term| {
                self.importances
                    .iter()
                    .map(move |importance| Period::full(academic_year, *term, importance.clone()))
            })
            .collect()
    }
}

#[async_trait]
impl PeriodService for CalendarPeriodService {
    async fn build_periods(&self, _pid: Pid, year: i32, term: Option<Term>) -> Result<Vec<Period>> {
        let periods = match term {
            Some(term) => self.full_periods_of(year, &[term]),
            None => self.full_periods_of(year, &Term::ALL),
        };
        Ok(periods)
    }

    async fn period_range(&self, _pid: Pid, from: &Period, to: &Period) -> Result<Vec<Period>> {
        let lower = self.lower_key(from)?;
        let upper = self.upper_key(to)?;
        if lower > upper {
            return Err(ScholarError::invalid(format!(
                "period range starts after it ends: {from} > {to}"
            )));
        }

        let mut periods = Vec::new();
        for year in from.academic_year..=to.academic_year {
            for term in Term::ALL {
                for (position, importance) in self.importances.iter().enumerate() {
                    let key = (year, term, position);
                    if key >= lower && key <= upper {
                        periods.push(Period::full(year, term, importance.clone()));
                    }
                }
            }
        }
        Ok(periods)
    }

    async fn period_to_engage_term(&self, _pid: Pid, period: &Period) -> Result<String> {
        period
            .term
            .map(|term| term.engage_label().to_string())
            .ok_or_else(|| ScholarError::invalid(format!("period {period} has no term")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const PID: Pid = Pid::new(1);

    #[tokio::test]
    async fn test_build_periods_for_term() {
        let calendar = CalendarPeriodService::default();
        let periods = calendar
            .build_periods(PID, 2023, Some(Term::Spring))
            .await
            .unwrap();
        assert_eq!(
            periods,
            vec![
                Period::full(2023, Term::Spring, "Test"),
                Period::full(2023, Term::Spring, "Exam"),
            ]
        );
    }

    #[tokio::test]
    async fn test_build_periods_for_year() {
        let calendar = CalendarPeriodService::default();
        let periods = calendar.build_periods(PID, 2023, None).await.unwrap();
        assert_eq!(periods.len(), 6);
        assert!(periods.iter().all(Period::is_full));
    }

    #[tokio::test]
    async fn test_period_range_is_inclusive_and_ordered() {
        let calendar = CalendarPeriodService::default();
        let periods = calendar
            .period_range(
                PID,
                &Period::full(2022, Term::Summer, "Exam"),
                &Period::full(2023, Term::Autumn, "Test"),
            )
            .await
            .unwrap();
        assert_eq!(
            periods,
            vec![
                Period::full(2022, Term::Summer, "Exam"),
                Period::full(2023, Term::Autumn, "Test"),
            ]
        );
    }

    #[tokio::test]
    async fn test_period_range_expands_partial_bounds() {
        let calendar = CalendarPeriodService::default();
        let periods = calendar
            .period_range(PID, &Period::term(2023, Term::Spring), &Period::year(2023))
            .await
            .unwrap();
        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0], Period::full(2023, Term::Spring, "Test"));
        assert_eq!(periods[3], Period::full(2023, Term::Summer, "Exam"));
    }

    #[tokio::test]
    async fn test_period_range_rejects_reversed_bounds() {
        let calendar = CalendarPeriodService::default();
        let err = calendar
            .period_range(PID, &Period::year(2024), &Period::year(2023))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn test_period_range_rejects_unknown_importance() {
        let calendar = CalendarPeriodService::default();
        let err = calendar
            .period_range(
                PID,
                &Period::full(2023, Term::Autumn, "Coursework"),
                &Period::year(2023),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[tokio::test]
    async fn test_engage_term() {
        let calendar = CalendarPeriodService::default();
        assert_eq!(
            calendar
                .period_to_engage_term(PID, &Period::full(2023, Term::Autumn, "Exam"))
                .await
                .unwrap(),
            "Autumn Term"
        );
        assert!(calendar
            .period_to_engage_term(PID, &Period::year(2023))
            .await
            .is_err());
    }
}
