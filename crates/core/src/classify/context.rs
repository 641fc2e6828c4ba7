//! Resolution context handed to the classifiers.
//!
//! Resolution happens before classification: the resolver walks a
//! mutation's ledger requirements, consults the mapping table, and fills a
//! [`Resolution`] so the classifiers stay pure and synchronous.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{AccountId, LedgerCode, MutationId, PartyId};

use crate::ledger::AccountType;

use super::error::ClassifyError;

/// An internal account with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAccount {
    /// The internal account.
    pub account: AccountId,
    /// Root classification, driving the sign convention.
    pub account_type: AccountType,
}

/// Role a party plays on a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    /// Customer (receivable side).
    Customer,
    /// Supplier (payable side).
    Supplier,
}

/// Fallback and control accounts, resolved once at run start.
///
/// A missing required account is a fatal configuration error detected
/// before the first mutation is processed.
#[derive(Debug, Clone, Copy)]
pub struct FallbackAccounts {
    /// Suspense account for unmapped ledger codes.
    pub suspense: ResolvedAccount,
    /// Equity account absorbing opening balance residuals.
    pub balancing: ResolvedAccount,
    /// Default bank/cash account.
    pub bank: ResolvedAccount,
    /// Default income account.
    pub income: ResolvedAccount,
    /// Default expense account.
    pub expense: ResolvedAccount,
    /// Accounts receivable control account.
    pub receivable: ResolvedAccount,
    /// Accounts payable control account.
    pub payable: ResolvedAccount,
    /// VAT payable account.
    pub vat_payable: Option<ResolvedAccount>,
    /// VAT receivable account.
    pub vat_receivable: Option<ResolvedAccount>,
}

/// Everything a classifier needs besides the mutation itself.
#[derive(Debug, Clone)]
pub struct Resolution {
    accounts: HashMap<LedgerCode, ResolvedAccount>,
    /// The resolved party, when the mutation names a relation.
    pub party: Option<PartyId>,
    /// Fallback and control accounts.
    pub fallbacks: FallbackAccounts,
}

impl Resolution {
    /// Creates an empty resolution over the given fallback accounts.
    #[must_use]
    pub fn new(fallbacks: FallbackAccounts) -> Self {
        Self {
            accounts: HashMap::new(),
            party: None,
            fallbacks,
        }
    }

    /// Records a resolved ledger code.
    pub fn insert(&mut self, code: LedgerCode, resolved: ResolvedAccount) {
        self.accounts.insert(code, resolved);
    }

    /// Sets the resolved party.
    pub fn set_party(&mut self, party: PartyId) {
        self.party = Some(party);
    }

    /// Looks up a resolved ledger code.
    #[must_use]
    pub fn account(&self, code: LedgerCode) -> Option<ResolvedAccount> {
        self.accounts.get(&code).copied()
    }

    /// Looks up a resolved ledger code, failing the mutation when absent.
    pub fn require(
        &self,
        code: LedgerCode,
        mutation: MutationId,
    ) -> Result<ResolvedAccount, ClassifyError> {
        self.account(code)
            .ok_or(ClassifyError::UnresolvedLedger { mutation, ledger: code })
    }
}
