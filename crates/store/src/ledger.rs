//! Ledger store seam.
//!
//! The ledger store belongs to the target accounting system; the engine
//! only reads account metadata, creates fallback accounts, commits
//! transactions atomically, and looks committed transactions up by their
//! external reference. The in-memory implementation is the reference for
//! those semantics and backs the test suite and the demo importer.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use boekstroom_core::ledger::{AccountType, ExternalRef, TransactionDraft};
use boekstroom_shared::types::{AccountId, TransactionId};

use super::error::StoreError;

/// Account metadata as the target system reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// The internal account id.
    pub id: AccountId,
    /// Account code in the chart of accounts.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Root classification.
    pub account_type: AccountType,
    /// Group accounts structure the chart and reject postings.
    pub is_group: bool,
}

/// A new account to create (fallback/placeholder use only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Root classification.
    pub account_type: AccountType,
}

/// A committed transaction as the ledger store records it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommittedTransaction {
    /// The assigned transaction id.
    pub id: TransactionId,
    /// The committed draft (header + lines + allocation).
    pub draft: TransactionDraft,
}

/// Operations the engine needs from the target ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Reads account metadata.
    async fn account_info(&self, id: AccountId) -> Result<Option<AccountInfo>, StoreError>;

    /// Finds an account by its chart-of-accounts code.
    async fn find_account_by_code(&self, code: &str) -> Result<Option<AccountInfo>, StoreError>;

    /// Creates an account; used only for documented fallbacks such as the
    /// balancing account.
    async fn create_account(&self, account: NewAccount) -> Result<AccountInfo, StoreError>;

    /// Persists a validated draft atomically: header and all lines, or
    /// nothing. The transaction is tagged with the draft's external
    /// reference for deduplication.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a transaction with the same
    /// external reference already exists.
    async fn create_transaction(&self, draft: &TransactionDraft)
        -> Result<TransactionId, StoreError>;

    /// Looks up a committed transaction by external reference, across all
    /// transaction kinds.
    async fn find_by_external_ref(
        &self,
        external_ref: &ExternalRef,
    ) -> Result<Option<TransactionId>, StoreError>;
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, AccountInfo>,
    accounts_by_code: HashMap<String, AccountId>,
    transactions: HashMap<TransactionId, CommittedTransaction>,
    by_external_ref: HashMap<ExternalRef, TransactionId>,
}

/// In-memory reference implementation of [`LedgerStore`].
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    state: RwLock<LedgerState>,
}

impl MemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account and returns its metadata.
    ///
    /// # Panics
    ///
    /// Panics when the internal lock is poisoned.
    pub fn seed_account(
        &self,
        code: &str,
        name: &str,
        account_type: AccountType,
        is_group: bool,
    ) -> AccountInfo {
        let info = AccountInfo {
            id: AccountId::new(),
            code: code.to_string(),
            name: name.to_string(),
            account_type,
            is_group,
        };
        let mut state = self.state.write().expect("ledger state lock");
        state.accounts_by_code.insert(info.code.clone(), info.id);
        state.accounts.insert(info.id, info.clone());
        info
    }

    /// Returns all committed transactions, ordered by insertion id.
    ///
    /// # Panics
    ///
    /// Panics when the internal lock is poisoned.
    #[must_use]
    pub fn committed(&self) -> Vec<CommittedTransaction> {
        let state = self.state.read().expect("ledger state lock");
        let mut all: Vec<CommittedTransaction> = state.transactions.values().cloned().collect();
        all.sort_by_key(|tx| tx.id.into_inner());
        all
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn account_info(&self, id: AccountId) -> Result<Option<AccountInfo>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(state.accounts.get(&id).cloned())
    }

    async fn find_account_by_code(&self, code: &str) -> Result<Option<AccountInfo>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(state
            .accounts_by_code
            .get(code)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn create_account(&self, account: NewAccount) -> Result<AccountInfo, StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        if state.accounts_by_code.contains_key(&account.code) {
            return Err(StoreError::Conflict(format!(
                "account code {} already exists",
                account.code
            )));
        }
        let info = AccountInfo {
            id: AccountId::new(),
            code: account.code,
            name: account.name,
            account_type: account.account_type,
            is_group: false,
        };
        state.accounts_by_code.insert(info.code.clone(), info.id);
        state.accounts.insert(info.id, info.clone());
        Ok(info)
    }

    async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<TransactionId, StoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        if state.by_external_ref.contains_key(&draft.external_ref) {
            return Err(StoreError::Conflict(format!(
                "transaction for external ref {} already exists",
                draft.external_ref
            )));
        }
        let id = TransactionId::new();
        state.by_external_ref.insert(draft.external_ref, id);
        state.transactions.insert(
            id,
            CommittedTransaction {
                id,
                draft: draft.clone(),
            },
        );
        Ok(id)
    }

    async fn find_by_external_ref(
        &self,
        external_ref: &ExternalRef,
    ) -> Result<Option<TransactionId>, StoreError> {
        let state = self
            .state
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(state.by_external_ref.get(external_ref).copied())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use boekstroom_core::ledger::{TransactionLine, TransactionType};
    use boekstroom_shared::types::MutationId;

    use super::*;

    fn draft(external_id: i64, debit_account: AccountId, credit_account: AccountId) -> TransactionDraft {
        TransactionDraft {
            transaction_type: TransactionType::Journal,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: "test".to_string(),
            external_ref: ExternalRef::Mutation(MutationId::from(external_id)),
            invoice_number: None,
            lines: vec![
                TransactionLine::debit(debit_account, dec!(10)),
                TransactionLine::credit(credit_account, dec!(10)),
            ],
            allocation: None,
        }
    }

    #[tokio::test]
    async fn test_seed_and_find_by_code() {
        let store = MemoryLedgerStore::new();
        let seeded = store.seed_account("1100", "Bank", AccountType::Asset, false);
        let found = store.find_account_by_code("1100").await.unwrap().unwrap();
        assert_eq!(found, seeded);
        assert_eq!(store.account_info(seeded.id).await.unwrap(), Some(found));
    }

    #[tokio::test]
    async fn test_create_transaction_and_lookup() {
        let store = MemoryLedgerStore::new();
        let a = store.seed_account("1", "A", AccountType::Asset, false);
        let b = store.seed_account("2", "B", AccountType::Equity, false);
        let id = store.create_transaction(&draft(7, a.id, b.id)).await.unwrap();
        let found = store
            .find_by_external_ref(&ExternalRef::Mutation(MutationId::from(7)))
            .await
            .unwrap();
        assert_eq!(found, Some(id));
        assert_eq!(store.committed().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_external_ref_conflicts() {
        let store = MemoryLedgerStore::new();
        let a = store.seed_account("1", "A", AccountType::Asset, false);
        let b = store.seed_account("2", "B", AccountType::Equity, false);
        store.create_transaction(&draft(7, a.id, b.id)).await.unwrap();
        let err = store
            .create_transaction(&draft(7, a.id, b.id))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.committed().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_account_code_conflicts() {
        let store = MemoryLedgerStore::new();
        store.seed_account("1100", "Bank", AccountType::Asset, false);
        let err = store
            .create_account(NewAccount {
                code: "1100".to_string(),
                name: "Bank again".to_string(),
                account_type: AccountType::Asset,
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }
}
