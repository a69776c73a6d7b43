//! Error Types
//!
//! This module provides the error taxonomy shared by every scholar crate.
//!
//! Every error raised across a crate boundary carries exactly one
//! [`ErrorKind`] plus a human-readable message. The kind drives both local
//! branching (e.g. "not found upstream" versus "transport failure") and the
//! status code reported by a boundary layer.
//!
//! # Example
//!
//! ```
//! use scholar_core::{ErrorKind, Result, ScholarError};
//!
//! fn find_student(pid: i64) -> Result<String> {
//!     if pid <= 0 {
//!         return Err(ScholarError::invalid(format!("invalid pupil id: {pid}")));
//!     }
//!     Err(ScholarError::not_found("student not found"))
//! }
//!
//! assert_eq!(find_student(7).unwrap_err().kind(), ErrorKind::NotFound);
//! ```

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The operation conflicts with existing state. Maps to HTTP 409.
    Conflict,
    /// Unexpected failure, including transport errors. Maps to HTTP 500.
    Internal,
    /// Caller supplied invalid or incomplete input. Maps to HTTP 400.
    Invalid,
    /// The entity does not exist in the queried scope. Maps to HTTP 404.
    NotFound,
    /// The operation is not implemented. Maps to HTTP 501.
    NotImplemented,
    /// Authentication failure. Maps to HTTP 401.
    Unauthorized,
}

const STATUS_TABLE: [(ErrorKind, StatusCode); 6] = [
    (ErrorKind::Conflict, StatusCode::CONFLICT),
    (ErrorKind::Invalid, StatusCode::BAD_REQUEST),
    (ErrorKind::NotFound, StatusCode::NOT_FOUND),
    (ErrorKind::NotImplemented, StatusCode::NOT_IMPLEMENTED),
    (ErrorKind::Unauthorized, StatusCode::UNAUTHORIZED),
    (ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
];

impl ErrorKind {
    /// HTTP status a boundary layer should answer with for this kind.
    #[must_use]
    pub fn status(self) -> StatusCode {
        STATUS_TABLE
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or(StatusCode::INTERNAL_SERVER_ERROR, |(_, status)| *status)
    }

    /// Kind for an HTTP status received from a remote service.
    ///
    /// Unmapped statuses collapse to [`ErrorKind::Internal`].
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        STATUS_TABLE
            .iter()
            .find(|(_, s)| *s == status)
            .map_or(ErrorKind::Internal, |(kind, _)| *kind)
    }

    /// Stable snake_case code for this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
            ErrorKind::Invalid => "invalid",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotImplemented => "not_implemented",
            ErrorKind::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standardized error type for scholar.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ScholarError {
    kind: ErrorKind,
    message: String,
}

impl ScholarError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create an invalid-input error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a not implemented error.
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotImplemented, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Error returned when a cancellation token fires at a checkpoint.
    pub fn cancelled(what: impl fmt::Display) -> Self {
        Self::internal(format!("{what}: operation cancelled"))
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status matching [`Self::kind`].
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Prefix the message with context, keeping the kind.
    #[must_use]
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }
}

/// Type alias for Results using `ScholarError`.
pub type Result<T> = std::result::Result<T, ScholarError>;
