//! Error types for the persistence layer.
//!
//! Every store operation returns [`StoreResult`]. Storage-layer failures are
//! classified into the closed set of [`StoreError`] kinds so callers can match
//! exhaustively and map each kind to their own transport-level status.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::validation::ValidationErrors;

/// The error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record exists under the requested key.
    #[error("{resource} not found: {key}")]
    NotFound { resource: &'static str, key: String },

    /// The supplied concurrency token no longer matches the stored one.
    #[error("edit conflict: {resource}/{id} is no longer at version {version}")]
    EditConflict {
        resource: &'static str,
        id: String,
        version: i64,
    },

    /// One or more field rules were violated; nothing was written.
    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    /// A uniqueness constraint was violated at write time.
    #[error("duplicate key: {constraint}")]
    DuplicateKey { constraint: String },

    /// The operation exceeded its deadline or could not acquire a lock in time.
    #[error("operation timed out: {message}")]
    Timeout { message: String },

    /// Any other storage failure.
    #[error("storage failure: {message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    pub(crate) fn not_found(resource: &'static str, key: impl ToString) -> Self {
        StoreError::NotFound {
            resource,
            key: key.to_string(),
        }
    }

    pub(crate) fn unknown(message: impl Into<String>) -> Self {
        StoreError::Unknown {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true for `EditConflict`.
    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, StoreError::EditConflict { .. })
    }

    /// Returns the field errors carried by `ValidationFailed`.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            StoreError::ValidationFailed(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::ValidationFailed(errors)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match &err {
            rusqlite::Error::SqliteFailure(failure, message) => match failure.code {
                ErrorCode::ConstraintViolation
                    if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
                {
                    StoreError::DuplicateKey {
                        constraint: message.clone().unwrap_or_else(|| err.to_string()),
                    }
                }
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => StoreError::Timeout {
                    message: format!("database lock not acquired: {}", err),
                },
                ErrorCode::OperationInterrupted => StoreError::Timeout {
                    message: "statement interrupted".to_string(),
                },
                _ => StoreError::Unknown {
                    message: err.to_string(),
                    source: Some(Box::new(err)),
                },
            },
            _ => StoreError::Unknown {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StoreError {
    // r2d2 only fails a checkout once its connection timeout has elapsed
    fn from(err: r2d2::Error) -> Self {
        StoreError::Timeout {
            message: format!("connection pool checkout failed: {}", err),
        }
    }
}
