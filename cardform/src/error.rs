//! Error types and result definitions for form operations.

use thiserror::Error;

/// Errors raised by the form engine and its collaborators.
///
/// Shape disagreements between a schema and a document are never reported
/// through this type: the walker and the mutation engine recover from them
/// locally.
#[derive(Debug, Error)]
pub enum FormError {
    /// Schema text supplied by the user is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    SchemaParse(#[source] serde_json::Error),

    /// Removal addressed an element outside the sequence.
    #[error("index {index} is out of range for `{path}` (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    /// Raw user input could not be turned into a value for a field.
    #[error("invalid input for `{path}`: {reason}")]
    InvalidInput { path: String, reason: String },

    /// No bundled template carries the requested label or version.
    #[error("no bundled template named `{0}`")]
    UnknownTemplate(String),

    /// Store position does not hold a card.
    #[error("card {index} not found (store holds {len} cards)")]
    NotFound { index: usize, len: usize },

    /// Stored data could not be encoded or decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying file operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    /// Creates an [`FormError::InvalidInput`] for the given path.
    pub fn invalid_input(path: impl ToString, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FormError>;
