//! CLI error types and exit codes

use scholar_core::{ErrorKind, JobId, ScholarError};
use scholar_db::DbError;
use scholar_engage::EngageError;
use thiserror::Error;

use crate::config::ConfigError;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 2: Engage rejected the credential
/// - 4: Invalid input or missing record
/// - 5: Upstream or storage failure
/// - 130: Job cancelled
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Engage(#[from] EngageError),

    #[error("{0}")]
    Service(#[from] ScholarError),

    #[error("Job {id} failed: {error}")]
    JobFailed { id: JobId, error: ScholarError },

    #[error("Job {0} was cancelled")]
    JobCancelled(JobId),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

fn kind_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Unauthorized => 2,
        ErrorKind::Invalid | ErrorKind::NotFound | ErrorKind::Conflict => 4,
        ErrorKind::Internal => 5,
        ErrorKind::NotImplemented => 1,
    }
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Logging(_) | CliError::Output(_) => 1,
            CliError::Db(_) => 5,
            CliError::Engage(e) => kind_exit_code(e.kind()),
            CliError::Service(e) => kind_exit_code(e.kind()),
            CliError::JobFailed { error, .. } => kind_exit_code(error.kind()),
            CliError::JobCancelled(_) => 130,
        }
    }

    /// Print the error to stderr
    pub fn print(&self) {
        eprintln!("Error: {self}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            CliError::Service(ScholarError::not_found("student 7")).exit_code(),
            4
        );
        assert_eq!(
            CliError::JobFailed {
                id: JobId::from_raw(1),
                error: ScholarError::internal("engage: HTTP 502"),
            }
            .exit_code(),
            5
        );
        assert_eq!(CliError::JobCancelled(JobId::from_raw(1)).exit_code(), 130);
        assert_eq!(
            CliError::Config(ConfigError::MissingVar("ENGAGE_TOKEN".into())).exit_code(),
            1
        );
    }
}
