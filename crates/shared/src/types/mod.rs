//! Common types used across the application.

pub mod amount;
pub mod id;


pub use amount::round_amount;
pub use id::{
    AccountId, LedgerCode, MigrationRunId, MutationId, PartyId, RelationCode, TransactionId,
};
