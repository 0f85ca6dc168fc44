//! Unified application error types for MyCloud.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Validation failures additionally
//! carry the name of the input field they belong to, so that callers can
//! report them per field instead of per request.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// The caller does not own the resource it tried to act on.
    Authorization,
    /// Input validation failed.
    Validation,
    /// A uniqueness constraint was violated in the backing store.
    Conflict,
    /// An internal error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A storage I/O error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authorization => write!(f, "PERMISSION_DENIED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

/// Machine-readable reason attached to a field-level validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// The file extension is not in the configured allow-list.
    InvalidExtension,
    /// Another file with the same name exists in the same folder.
    DuplicateName,
    /// The supplied name is empty or whitespace.
    EmptyName,
    /// The supplied name exceeds the maximum length.
    NameTooLong,
    /// The supplied name contains a path separator or control character,
    /// or is a relative path component.
    InvalidName,
    /// The uploaded content exceeds the maximum upload size.
    TooLarge,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExtension => write!(f, "invalid_extension"),
            Self::DuplicateName => write!(f, "duplicate_name"),
            Self::EmptyName => write!(f, "empty_name"),
            Self::NameTooLong => write!(f, "name_too_long"),
            Self::InvalidName => write!(f, "invalid_name"),
            Self::TooLarge => write!(f, "too_large"),
        }
    }
}

/// The unified application error used throughout MyCloud.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// The input field a validation error is attached to.
    pub field: Option<String>,
    /// Machine-readable validation reason.
    pub reason: Option<ValidationReason>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            reason: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            reason: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error attached to an input field.
    pub fn invalid_field(
        field: impl Into<String>,
        reason: ValidationReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            field: Some(field.into()),
            reason: Some(reason),
            source: None,
        }
    }

    /// Attach (or replace) the field this error belongs to.
    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a permission-denied error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error that is not tied to a field.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Whether this error is of the given kind.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    /// Whether this is a validation error with the given reason.
    pub fn has_reason(&self, reason: ValidationReason) -> bool {
        self.reason == Some(reason)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            field: self.field.clone(),
            reason: self.reason,
            source: None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
