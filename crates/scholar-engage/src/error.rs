//! Engage client and render parser errors.

use scholar_core::{ErrorKind, ScholarError};
use thiserror::Error;

/// Errors raised while recovering records from a marksheet render.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Nothing left in the render matches.
    #[error("couldnt match any {what} from current render")]
    NotFound { what: &'static str },

    /// The render does not have the expected boundary layout.
    #[error("unexpected render layout at offset {offset}: {detail}")]
    Structure { offset: usize, detail: String },

    /// A percentage token outside `[0, 100]`.
    #[error("render percentage {raw} outside [0, 100]")]
    Percentage { raw: String },
}

impl RenderError {
    pub(crate) fn structure(offset: usize, detail: impl Into<String>) -> Self {
        Self::Structure {
            offset,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            RenderError::NotFound { .. } => ErrorKind::NotFound,
            RenderError::Structure { .. } => ErrorKind::Internal,
            RenderError::Percentage { .. } => ErrorKind::Invalid,
        }
    }
}

/// Errors that can occur when talking to Engage.
#[derive(Debug, Error)]
pub enum EngageError {
    /// Engage answered with an empty data array.
    #[error("engage: invalid PID: {pid}")]
    NotFound { pid: String },

    /// Non-success status with a decodable Engage error body.
    #[error("engage: {message}, stack trace: {stack_trace}, exception type: {exception_type}")]
    Upstream {
        kind: ErrorKind,
        status: u16,
        message: String,
        stack_trace: String,
        exception_type: String,
    },

    /// Non-success status whose body could not be decoded.
    #[error("engage: HTTP {status}: {detail}")]
    Status {
        kind: ErrorKind,
        status: u16,
        detail: String,
    },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Success status with an undecodable payload.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The cancellation token fired while waiting between calls.
    #[error("engage: operation cancelled")]
    Cancelled,
}

impl EngageError {
    /// Domain classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngageError::NotFound { .. } => ErrorKind::NotFound,
            EngageError::Upstream { kind, .. } | EngageError::Status { kind, .. } => *kind,
            EngageError::InvalidConfig(_) => ErrorKind::Invalid,
            EngageError::Render(e) => e.kind(),
            EngageError::Http(_) | EngageError::Parse(_) | EngageError::Cancelled => {
                ErrorKind::Internal
            }
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<RenderError> for ScholarError {
    fn from(err: RenderError) -> Self {
        ScholarError::new(err.kind(), err.to_string())
    }
}

impl From<EngageError> for ScholarError {
    fn from(err: EngageError) -> Self {
        ScholarError::new(err.kind(), err.to_string())
    }
}

/// Result type for Engage operations.
pub type EngageResult<T> = Result<T, EngageError>;
