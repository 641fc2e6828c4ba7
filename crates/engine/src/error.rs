//! Engine error taxonomy.
//!
//! Three families: client errors (transient vs permanent, feeding the
//! retry policy), resolution errors (per-mutation failures), and the
//! engine-level error for conditions where no mutation can proceed.

use thiserror::Error;

use boekstroom_shared::types::{AccountId, LedgerCode};
use boekstroom_store::StoreError;

/// Errors from the external mutation API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The transport failed (connection refused, DNS, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered 5xx or 429.
    #[error("Server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The server rejected the request (other 4xx).
    #[error("Request rejected {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// The session could not be opened.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The response body could not be decoded.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Returns true when retrying the request may succeed.
    ///
    /// Timeouts, transport failures, and 5xx/429 responses are transient;
    /// 4xx rejections, authentication and decode failures are not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_) | Self::Server { .. })
    }
}

/// Errors resolving a ledger or relation code for one mutation.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The code has no mapping and its position admits no fallback.
    #[error("No mapping for ledger {0} and no fallback applies")]
    UnmappedStrict(LedgerCode),

    /// The mapping points at an account the ledger store does not know.
    #[error("Mapping for ledger {ledger} points at missing account {account}")]
    BrokenMapping {
        /// The mapped external code.
        ledger: LedgerCode,
        /// The dangling account id.
        account: AccountId,
    },

    /// The mapping or party store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ResolveError {
    /// Returns the error code for reports and structured logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnmappedStrict(_) => "UNMAPPED_LEDGER",
            Self::BrokenMapping { .. } => "BROKEN_MAPPING",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

/// Engine-level errors: nothing in the run can proceed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external API failed at the run level.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A store failed at the run level.
    #[error(transparent)]
    Store(#[from] StoreError),
}
