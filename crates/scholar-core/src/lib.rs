//! scholar Core Library
//!
//! Shared types and traits for scholar.
//!
//! # Modules
//!
//! - [`error`] - Error taxonomy shared across crates (ScholarError, ErrorKind)
//! - [`ids`] - Strongly typed identifiers (JobId, Pid)
//! - [`models`] - Students, subjects, marks and periods
//! - [`services`] - Student, mark and period capability traits
//! - [`calendar`] - Fixed-calendar period service
//! - [`refresh`] - Refresh requests, summaries and the refresh context
//! - [`ranking`] - Ranking interface
//!
//! # Example
//!
//! ```
//! use scholar_core::{Period, Pid, Result, ScholarError, Term};
//!
//! fn require_full(period: &Period) -> Result<()> {
//!     if !period.is_full() {
//!         return Err(ScholarError::invalid(format!("{period} is not full")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_full(&Period::full(2023, Term::Autumn, "Exam")).is_ok());
//! assert!(require_full(&Period::year(2023)).is_err());
//! let _ = Pid::new(100);
//! ```

pub mod calendar;
pub mod error;
pub mod ids;
pub mod models;
pub mod ranking;
pub mod refresh;
pub mod services;

// Re-export main types for convenient access
pub use calendar::CalendarPeriodService;
pub use error::{ErrorKind, Result, ScholarError};
pub use ids::{JobId, ParseIdError, Pid};
pub use models::{Mark, MarksFilter, Percentage, Period, Student, StudentFilter, Subject, Term};
pub use ranking::{Rank, RankingFilter, RankingService, UnimplementedRanking};
pub use refresh::{
    ProgressSink, RefreshContext, RefreshMarksRequest, RefreshStudentsRequest, RefreshSummary,
};
pub use services::{MarkService, PeriodService, StudentService};
