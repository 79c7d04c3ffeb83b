//! Error types for seniorconnect.
//!
//! This module defines all error types used throughout the seniorconnect crate.
//! Errors fall into two groups: those the user can correct (bad form input,
//! unknown ids, a busy line) and those raised at a boundary (storage,
//! telephony, configuration) that terminate the current operation.

use std::path::PathBuf;
use thiserror::Error;

use crate::call::SessionId;

/// The main error type for seniorconnect operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// Malformed input to a registration or update.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the rejected input.
        message: String,
    },

    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
        /// The id that was not found.
        id: String,
    },

    /// A record with the same id is already present.
    #[error("duplicate id: {id}")]
    DuplicateId {
        /// The colliding id.
        id: String,
    },

    /// A call was requested without a phone number.
    #[error("invalid call target: phone number is empty")]
    InvalidTarget,

    /// A call was requested while another session is current.
    #[error("a call is already in progress (session {session})")]
    SessionBusy {
        /// The session that is still current.
        session: SessionId,
    },

    /// The telephony provider reported a failure.
    #[error("provider error: {0}")]
    Provider(String),

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An operation timed out.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for seniorconnect operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a new provider error.
    #[must_use]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if the caller can fix this error by correcting its input
    /// (re-prompting a form, picking another volunteer, waiting for the line).
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::DuplicateId { .. }
                | Self::InvalidTarget
                | Self::SessionBusy { .. }
        )
    }

    /// Check if this error came from the telephony provider.
    #[must_use]
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Timeout { .. })
    }
}
