//! Errors converting raw mutations into the typed model.

use thiserror::Error;

use boekstroom_shared::types::MutationId;

/// Errors raised by [`super::Mutation::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The type code is not one the source system documents.
    #[error("Mutation {mutation} has unknown type code {type_code}")]
    UnknownType {
        /// The external mutation number.
        mutation: MutationId,
        /// The unrecognized type code.
        type_code: i32,
    },
}

impl MutationError {
    /// Returns the error code for reports and structured logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownType { .. } => "UNKNOWN_MUTATION_TYPE",
        }
    }
}
