//! Reconciliation engine for scholar.
//!
//! Brings the local store in line with Engage:
//!
//! - [`students`] - student lookups and the paced student refresh
//! - [`marks`] - mark lookups and the paced per-period mark refresh
//! - [`upstream`] - assembly of students and marks from Engage calls
//! - [`diff`] - which upstream marks are missing locally
//!
//! Reconciliation is append-only for subjects and marks: the refresh never
//! removes a subject link or a mark that Engage stopped reporting.

pub mod config;
pub mod diff;
pub mod marks;
pub mod students;
pub mod upstream;

pub use config::{academic_year_of, SyncConfig};
pub use diff::new_marks;
pub use marks::DbMarkService;
pub use students::{DbStudentService, StudentAction};
pub use upstream::{fetch_period_marks, fetch_student};
