//! Reconciliation settings.

use chrono::{Datelike, NaiveDate, Utc};
use std::time::Duration;

use scholar_engage::DEFAULT_PACING_INTERVAL;

/// Month the academic year rolls over in.
const ROLLOVER_MONTH: u32 = 9;

/// Reconciliation engine configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Wait between consecutive upstream calls of one refresh.
    pub pacing_interval: Duration,

    /// Store students that a lookup had to fetch from Engage.
    pub student_fallback: bool,

    /// Let full-period mark lookups fetch and store missing marks.
    pub mark_fallback: bool,

    /// A pupil attends school iff Engage lists this academic year for them.
    pub current_academic_year: i32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            pacing_interval: DEFAULT_PACING_INTERVAL,
            student_fallback: true,
            mark_fallback: true,
            current_academic_year: academic_year_of(Utc::now().date_naive()),
        }
    }
}

/// Academic year `date` falls in, named by the calendar year it starts in.
#[must_use]
pub fn academic_year_of(date: NaiveDate) -> i32 {
    if date.month() >= ROLLOVER_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}
