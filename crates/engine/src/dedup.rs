//! Deduplication guard.
//!
//! Looks up the external reference in the ledger store immediately before
//! commit — not only at fetch time — so re-entrant and overlapping runs
//! skip instead of double-posting.

use std::sync::Arc;

use boekstroom_core::ledger::ExternalRef;
use boekstroom_shared::types::TransactionId;
use boekstroom_store::{LedgerStore, StoreError};

/// Pre-commit duplicate check against the ledger store.
#[derive(Clone)]
pub struct DedupGuard {
    ledger: Arc<dyn LedgerStore>,
}

impl DedupGuard {
    /// Creates a guard over the given ledger store.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Returns the committed transaction already tagged with this
    /// external reference, across all transaction kinds.
    pub async fn already_imported(
        &self,
        external_ref: &ExternalRef,
    ) -> Result<Option<TransactionId>, StoreError> {
        self.ledger.find_by_external_ref(external_ref).await
    }
}
