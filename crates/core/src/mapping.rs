//! Ledger mapping records and fallback policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{AccountId, LedgerCode};

use crate::ledger::AccountType;

/// Association between an external ledger code and an internal account.
///
/// At most one active mapping exists per external code. Mappings are
/// created by administrators, or auto-created against a fallback account
/// when a code is first seen; auto-created rows carry `needs_review` so
/// they surface for manual correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMapping {
    /// The external ledger code.
    pub ledger: LedgerCode,
    /// The mapped internal account.
    pub account: AccountId,
    /// Human-readable account name, for review screens.
    pub account_name: String,
    /// Root classification of the mapped account.
    pub account_type: AccountType,
    /// True for auto-created placeholder mappings awaiting review.
    pub needs_review: bool,
    /// When the mapping was created.
    pub created_at: DateTime<Utc>,
}

/// Fallback account family to use when a ledger code has no mapping.
///
/// The resolver picks the fallback by where the code appears in a
/// mutation: the main ledger of a payment is a bank account, a sales
/// invoice row is income, and so on. `Strict` marks positions where a
/// missing mapping is a per-mutation failure instead (memorial main
/// ledgers, opening balance rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackHint {
    /// Default bank/cash account.
    Bank,
    /// Default income account.
    Income,
    /// Default expense account.
    Expense,
    /// Suspense account for codes with no better home.
    Suspense,
    /// No fallback; unmapped codes fail the mutation.
    Strict,
}
