//! Store seams for Boekstroom.
//!
//! The ledger and party stores belong to the target accounting system and
//! are modelled as traits with in-memory reference implementations. State
//! the engine owns itself — the mutation cache, the ledger mapping table,
//! and migration run reports — also gets a durable JSON implementation on
//! top of OpenDAL.

pub mod blob;
pub mod cache;
pub mod error;
pub mod ledger;
pub mod mapping;
pub mod party;
pub mod run;

pub use blob::BlobStore;
pub use cache::{FileMutationCache, MemoryMutationCache, MutationCache};
pub use error::StoreError;
pub use ledger::{AccountInfo, CommittedTransaction, LedgerStore, MemoryLedgerStore, NewAccount};
pub use mapping::{FileMappingStore, MappingStore, MemoryMappingStore};
pub use party::{MemoryPartyStore, Party, PartyStore};
pub use run::{FileRunStore, MemoryRunStore, RunStore};
