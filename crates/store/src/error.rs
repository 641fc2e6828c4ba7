//! Store error types.

use thiserror::Error;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The storage backend failed.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A persisted record could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns true for uniqueness violations.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<opendal::Error> for StoreError {
    fn from(err: opendal::Error) -> Self {
        if err.kind() == opendal::ErrorKind::NotFound {
            Self::NotFound(err.to_string())
        } else {
            Self::Backend(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
