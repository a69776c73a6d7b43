//! Domain model shared by the engine, the store and the job queue.

pub mod mark;
pub mod period;
pub mod student;
pub mod subject;

pub use mark::{Mark, MarksFilter, Percentage};
pub use period::{Period, Term};
pub use student::{Student, StudentFilter};
pub use subject::Subject;
