//! Typed IDs for type-safe entity references.
//!
//! Internal entities use UUID-backed IDs; records owned by the external
//! bookkeeping system keep their native integer or string identifiers,
//! wrapped so a `LedgerCode` can never be passed where a `MutationId`
//! is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate UUID-backed typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

/// Macro to generate integer-backed IDs for external bookkeeping records.
macro_rules! external_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Returns the raw external identifier.
            #[must_use]
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(AccountId, "Unique identifier for an internal ledger account.");
typed_id!(PartyId, "Unique identifier for a business partner (customer or supplier).");
typed_id!(TransactionId, "Unique identifier for a committed ledger transaction.");
typed_id!(MigrationRunId, "Unique identifier for a migration run.");

external_id!(MutationId, "External mutation number assigned by the bookkeeping system.");
external_id!(LedgerCode, "External ledger (grootboek) code in the bookkeeping system.");

/// External relation (party) code in the bookkeeping system.
///
/// Relation codes are opaque strings; the source system uses both numeric
/// and alphanumeric codes depending on account age.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationCode(pub String);

impl RelationCode {
    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RelationCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RelationCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RelationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
