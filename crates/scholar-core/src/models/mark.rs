//! Marks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScholarError;
use crate::ids::Pid;
use crate::models::period::Period;
use crate::models::subject::Subject;

/// A mark percentage, guaranteed to lie within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Percentage(u8);

impl Percentage {
    pub const MAX: u8 = 100;

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percentage {
    type Error = ScholarError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(v) if v <= Self::MAX => Ok(Self(v)),
            _ => Err(ScholarError::invalid(format!(
                "percentage {value} outside [0, {}]",
                Self::MAX
            ))),
        }
    }
}

impl From<Percentage> for i64 {
    fn from(p: Percentage) -> i64 {
        i64::from(p.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A mark obtained by a pupil in one subject during one period.
///
/// Marks are immutable once stored. Two marks are the same mark for
/// reconciliation purposes when they share pupil, period and subject name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// Local id; `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub student_pid: Pid,
    pub subject: Subject,
    pub teacher: String,
    pub percentage: Percentage,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Mark {
    /// Validate a mark before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` if the mark already carries an id, its period is not
    /// full, or its subject name is empty.
    pub fn validate(&self) -> crate::Result<()> {
        if self.id.is_some() {
            return Err(ScholarError::invalid("mark already persisted"));
        }
        if !self.period.is_full() {
            return Err(ScholarError::invalid(format!(
                "mark period {} is not a full period",
                self.period
            )));
        }
        if self.subject.name.trim().is_empty() {
            return Err(ScholarError::invalid("mark subject name is required"));
        }
        Ok(())
    }
}

/// Filter used to query stored marks. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarksFilter {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub pid: Option<Pid>,
    #[serde(default)]
    pub subject_id: Option<i64>,
    /// Marks must fall within one of these full periods (empty: any period).
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl MarksFilter {
    #[must_use]
    pub fn by_pid(pid: Pid) -> Self {
        Self {
            pid: Some(pid),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_periods(mut self, periods: Vec<Period>) -> Self {
        self.periods = periods;
        self
    }
}
