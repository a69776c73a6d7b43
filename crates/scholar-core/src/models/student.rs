//! Students.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScholarError;
use crate::ids::Pid;
use crate::models::mark::Mark;
use crate::models::subject::Subject;

/// A pupil as known locally or upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub pid: Pid,
    pub name: String,
    /// Year in program; only meaningful while `attends_school` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_year: Option<i32>,
    pub attends_school: bool,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub marks: Vec<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// A student that has not been stored yet.
    pub fn new(pid: Pid, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            current_year: None,
            attends_school: false,
            subjects: Vec::new(),
            marks: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Mark the student as attending in the given year of the program.
    #[must_use]
    pub fn attending(mut self, year: i32) -> Self {
        self.attends_school = true;
        self.current_year = Some(year);
        self
    }

    #[must_use]
    pub fn with_subjects(mut self, subjects: Vec<Subject>) -> Self {
        self.subjects = subjects;
        self
    }

    /// Validate the student before it is written.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a non-positive pid, an empty name, or a current
    /// year that disagrees with attendance.
    pub fn validate(&self) -> crate::Result<()> {
        if self.pid.get() <= 0 {
            return Err(ScholarError::invalid(format!("invalid pupil id: {}", self.pid)));
        }
        if self.name.trim().is_empty() {
            return Err(ScholarError::invalid("student name is required"));
        }
        match (self.attends_school, self.current_year) {
            (true, None) => Err(ScholarError::invalid(
                "attending student requires a current year",
            )),
            (false, Some(_)) => Err(ScholarError::invalid(
                "current year is only valid for attending students",
            )),
            _ => Ok(()),
        }
    }
}

/// Filter used to query stored students. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFilter {
    #[serde(default)]
    pub pid: Option<Pid>,
    /// Current year in program.
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub attends_school: Option<bool>,
    /// Only students taking this subject.
    #[serde(default)]
    pub subject_id: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl StudentFilter {
    #[must_use]
    pub fn by_pid(pid: Pid) -> Self {
        Self {
            pid: Some(pid),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_attendance_and_year() {
        assert!(Student::new(Pid::new(5), "Ana").validate().is_ok());
        assert!(Student::new(Pid::new(5), "Ana").attending(9).validate().is_ok());

        let mut inconsistent = Student::new(Pid::new(5), "Ana");
        inconsistent.current_year = Some(9);
        assert!(inconsistent.validate().is_err());

        let mut missing_year = Student::new(Pid::new(5), "Ana");
        missing_year.attends_school = true;
        assert!(missing_year.validate().is_err());
    }

    #[test]
    fn test_validate_identity() {
        assert!(Student::new(Pid::new(0), "Ana").validate().is_err());
        assert!(Student::new(Pid::new(5), "  ").validate().is_err());
    }
}
