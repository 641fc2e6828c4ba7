//! Transaction committer.
//!
//! Pre-fetches account metadata for a draft, runs the pure validation,
//! and persists through the ledger store's atomic `create_transaction`.
//! In dry-run mode validation still runs but nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use boekstroom_core::ledger::{validate_draft, AccountMeta, TransactionDraft, ValidationError};
use boekstroom_shared::types::{AccountId, TransactionId};
use boekstroom_store::{LedgerStore, StoreError};

/// Result of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The transaction was persisted.
    Committed(TransactionId),
    /// Dry run: validated, nothing persisted.
    DryRun,
}

/// Errors from the commit step.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The draft violates a commit invariant; nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The ledger store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validates and persists transaction drafts.
#[derive(Clone)]
pub struct TransactionCommitter {
    ledger: Arc<dyn LedgerStore>,
    dry_run: bool,
}

impl TransactionCommitter {
    /// Creates a committer over the given ledger store.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, dry_run: bool) -> Self {
        Self { ledger, dry_run }
    }

    /// Returns true when this committer never persists.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Validates the draft and, unless dry-running, persists it.
    pub async fn commit(&self, draft: &TransactionDraft) -> Result<CommitOutcome, CommitError> {
        let metas = self.fetch_account_metas(draft).await?;
        validate_draft(draft, |id| metas.get(&id).copied())?;

        if self.dry_run {
            return Ok(CommitOutcome::DryRun);
        }

        let id = self.ledger.create_transaction(draft).await?;
        info!(
            transaction = %id,
            external_ref = %draft.external_ref,
            lines = draft.lines.len(),
            "committed transaction"
        );
        Ok(CommitOutcome::Committed(id))
    }

    async fn fetch_account_metas(
        &self,
        draft: &TransactionDraft,
    ) -> Result<HashMap<AccountId, AccountMeta>, StoreError> {
        let mut metas = HashMap::new();
        for line in &draft.lines {
            if metas.contains_key(&line.account) {
                continue;
            }
            if let Some(info) = self.ledger.account_info(line.account).await? {
                metas.insert(
                    line.account,
                    AccountMeta {
                        account_type: info.account_type,
                        is_group: info.is_group,
                    },
                );
            }
        }
        Ok(metas)
    }
}
