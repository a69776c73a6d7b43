//! CLI subcommands.

pub mod marks;
pub mod refresh;
pub mod student;
