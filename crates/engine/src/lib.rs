//! Import engine for Boekstroom.
//!
//! Wires the pure core logic to the collaborator stores: fetches raw
//! mutations from the e-Boekhouden REST API into the cache, resolves
//! ledger and relation codes, classifies, deduplicates, and commits
//! balanced transactions — one migration run at a time.

pub mod bootstrap;
pub mod client;
pub mod committer;
pub mod dedup;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod retry;

pub use bootstrap::resolve_fallback_accounts;
pub use client::{EBoekhoudenClient, MutationSource};
pub use committer::{CommitOutcome, TransactionCommitter};
pub use dedup::DedupGuard;
pub use error::{ClientError, EngineError, ResolveError};
pub use orchestrator::{BatchOrchestrator, CancelHandle, RunOptions};
pub use resolver::LedgerResolver;
pub use retry::RetryPolicy;
