//! Error types for the board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur in board operations
///
/// There is no not-found variant: deleting or moving a card that is not on
/// the board is a no-op.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Card text is empty after trimming
    #[error("task text cannot be empty")]
    EmptyText,

    /// Column identifier did not parse
    #[error("unknown column: {value}")]
    UnknownColumn { value: String },

    /// Invalid field value
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Store lock is held by another process
    #[error("lock busy - another operation in progress")]
    LockBusy,

    /// Backing store failure not covered by a more specific variant
    #[error("store error: {message}")]
    Store { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create an unknown column error
    pub fn unknown_column(value: impl Into<String>) -> Self {
        Self::UnknownColumn {
            value: value.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Check if this error came from the persistence layer.
    ///
    /// Sessions reload authoritative state after these.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Self::LockBusy | Self::Store { .. } | Self::Io(_) | Self::Json(_)
        )
    }

    /// Check if this is a validation error raised before touching storage
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyText | Self::UnknownColumn { .. } | Self::InvalidValue { .. }
        )
    }
}
