pub mod mark;
pub mod student;
pub mod subject;

pub use mark::MarkRow;
pub use student::StudentRow;
pub use subject::SubjectRow;
