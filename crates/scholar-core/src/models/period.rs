//! Academic periods.
//!
//! A [`Period`] names a grading window: an academic year, optionally narrowed
//! to a term and to one marksheet column ("importance", e.g. `Exam`). A period
//! that names all three is *full*: a closed grading column whose marks are
//! complete upstream.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScholarError;

/// School term within an academic year, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Autumn,
    Spring,
    Summer,
}

impl Term {
    /// All terms in calendar order.
    pub const ALL: [Term; 3] = [Term::Autumn, Term::Spring, Term::Summer];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Term::Autumn => "autumn",
            Term::Spring => "spring",
            Term::Summer => "summer",
        }
    }

    /// Label used by Engage reporting periods.
    #[must_use]
    pub fn engage_label(self) -> &'static str {
        match self {
            Term::Autumn => "Autumn Term",
            Term::Spring => "Spring Term",
            Term::Summer => "Summer Term",
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Term {
    type Err = ScholarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "autumn" => Ok(Term::Autumn),
            "spring" => Ok(Term::Spring),
            "summer" => Ok(Term::Summer),
            other => Err(ScholarError::invalid(format!("unknown term: {other}"))),
        }
    }
}

/// A grading window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Calendar year in which the academic year starts.
    pub academic_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<Term>,
    /// Marksheet column, e.g. `Exam` or `Test`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
}

impl Period {
    /// A whole academic year.
    #[must_use]
    pub fn year(academic_year: i32) -> Self {
        Self {
            academic_year,
            term: None,
            importance: None,
        }
    }

    /// One term of an academic year.
    #[must_use]
    pub fn term(academic_year: i32, term: Term) -> Self {
        Self {
            academic_year,
            term: Some(term),
            importance: None,
        }
    }

    /// A single grading column of one term.
    pub fn full(academic_year: i32, term: Term, importance: impl Into<String>) -> Self {
        Self {
            academic_year,
            term: Some(term),
            importance: Some(importance.into()),
        }
    }

    /// Whether the period is a closed grading column (term and importance set).
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.term.is_some() && self.importance.is_some()
    }

    /// Whether `other` lies within this (possibly partial) period.
    #[must_use]
    pub fn contains(&self, other: &Period) -> bool {
        if self.academic_year != other.academic_year {
            return false;
        }
        if let Some(term) = self.term {
            if other.term != Some(term) {
                return false;
            }
        }
        match &self.importance {
            Some(importance) => other.importance.as_deref() == Some(importance.as_str()),
            None => true,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.academic_year)?;
        if let Some(term) = self.term {
            write!(f, "/{term}")?;
        }
        if let Some(importance) = &self.importance {
            write!(f, "/{importance}")?;
        }
        Ok(())
    }
}

/// Parses `YEAR`, `YEAR/TERM` or `YEAR/TERM/IMPORTANCE`.
impl FromStr for Period {
    type Err = ScholarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '/');
        let year = parts
            .next()
            .unwrap_or_default()
            .parse::<i32>()
            .map_err(|e| ScholarError::invalid(format!("invalid academic year in {s:?}: {e}")))?;
        let term = parts.next().map(str::parse::<Term>).transpose()?;
        let importance = parts
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            academic_year: year,
            term,
            importance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullness() {
        assert!(!Period::year(2023).is_full());
        assert!(!Period::term(2023, Term::Spring).is_full());
        assert!(Period::full(2023, Term::Spring, "Exam").is_full());
    }

    #[test]
    fn test_importance_without_term_is_not_full() {
        let period = Period {
            academic_year: 2023,
            term: None,
            importance: Some("Exam".to_string()),
        };
        assert!(!period.is_full());
    }

    #[test]
    fn test_contains() {
        let exam = Period::full(2023, Term::Autumn, "Exam");
        assert!(Period::year(2023).contains(&exam));
        assert!(Period::term(2023, Term::Autumn).contains(&exam));
        assert!(!Period::term(2023, Term::Summer).contains(&exam));
        assert!(!Period::year(2022).contains(&exam));
        assert!(!Period::full(2023, Term::Autumn, "Test").contains(&exam));
    }

    #[test]
    fn test_parse() {
        assert_eq!("2022".parse::<Period>().unwrap(), Period::year(2022));
        assert_eq!(
            "2022/spring".parse::<Period>().unwrap(),
            Period::term(2022, Term::Spring)
        );
        assert_eq!(
            "2022/Summer/Exam".parse::<Period>().unwrap(),
            Period::full(2022, Term::Summer, "Exam")
        );
        assert!("winter".parse::<Period>().is_err());
        assert!("2022/winter".parse::<Period>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Period::full(2021, Term::Autumn, "Test").to_string(), "2021/autumn/Test");
    }
}
