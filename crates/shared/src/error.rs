//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Crate-local errors (classification, validation, store, client) convert
/// into this type at the boundaries where a single error channel is needed,
/// such as the importer binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external code could not be mapped to an internal record.
    #[error("Mapping error: {0}")]
    Mapping(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// External service error.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for reports and structured logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Mapping(_) => "MAPPING_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true when no mutation in the run can possibly succeed.
    ///
    /// Fatal errors abort a migration run immediately instead of being
    /// recorded as a per-mutation failure.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
