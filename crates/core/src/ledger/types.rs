//! Ledger domain types for transaction creation and validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{AccountId, MutationId, PartyId};

use super::sign::DebitCredit;

/// Root classification of an internal ledger account.
///
/// The root type determines the account's natural balance side and whether
/// it may appear in opening entries (balance sheet accounts only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset account (natural debit).
    Asset,
    /// Liability account (natural credit).
    Liability,
    /// Equity account (natural credit).
    Equity,
    /// Income account (natural credit).
    Income,
    /// Expense account (natural debit).
    Expense,
}

impl AccountType {
    /// Returns the side on which this account type normally carries its
    /// balance.
    #[must_use]
    pub const fn natural_side(&self) -> BalanceSide {
        match self {
            Self::Asset | Self::Expense => BalanceSide::Debit,
            Self::Liability | Self::Equity | Self::Income => BalanceSide::Credit,
        }
    }

    /// Returns true for balance sheet accounts (Asset, Liability, Equity).
    #[must_use]
    pub const fn is_balance_sheet(&self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }

    /// Returns true for profit-and-loss accounts (Income, Expense).
    #[must_use]
    pub const fn is_profit_and_loss(&self) -> bool {
        !self.is_balance_sheet()
    }
}

/// One side of a double-entry line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceSide {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

impl BalanceSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Target transaction kind, recorded on the committed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Sales invoice (receivable against income).
    SalesInvoice,
    /// Purchase invoice (payable against expense).
    PurchaseInvoice,
    /// Customer or supplier payment.
    Payment,
    /// Journal entry (money transfer or memorial booking).
    Journal,
    /// Synthetic opening balance entry.
    OpeningBalance,
}

/// Reference tying a committed transaction back to its external source.
///
/// Every committed transaction carries exactly one external reference; the
/// deduplication guard looks transactions up by it. Opening balances are a
/// single synthetic entry per migration history and use a fixed marker
/// instead of a mutation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalRef {
    /// An ordinary mutation, identified by its external number.
    Mutation(MutationId),
    /// The synthetic opening balance entry.
    OpeningBalance,
}

impl std::fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mutation(id) => write!(f, "{id}"),
            Self::OpeningBalance => write!(f, "OPENING_BALANCE"),
        }
    }
}

/// Settlement hint for payments that reference open invoices.
///
/// The ledger store's reporting layer uses this to close the referenced
/// invoices rather than merely recording a bank movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAllocation {
    /// The paying/paid party.
    pub party: PartyId,
    /// Invoice numbers this payment settles.
    pub invoice_numbers: Vec<String>,
}

/// A single draft line naming an account and one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    /// The internal account to post to.
    pub account: AccountId,
    /// Debit amount (zero if the line is a credit).
    pub debit: Decimal,
    /// Credit amount (zero if the line is a debit).
    pub credit: Decimal,
    /// Party attached to receivable/payable lines.
    pub party: Option<PartyId>,
    /// Optional per-line memo.
    pub description: Option<String>,
}

impl TransactionLine {
    /// Creates a debit line.
    #[must_use]
    pub fn debit(account: AccountId, amount: Decimal) -> Self {
        Self {
            account,
            debit: amount,
            credit: Decimal::ZERO,
            party: None,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub fn credit(account: AccountId, amount: Decimal) -> Self {
        Self {
            account,
            debit: Decimal::ZERO,
            credit: amount,
            party: None,
            description: None,
        }
    }

    /// Creates a line from a debit/credit split.
    #[must_use]
    pub fn from_split(account: AccountId, split: DebitCredit) -> Self {
        Self {
            account,
            debit: split.debit,
            credit: split.credit,
            party: None,
            description: None,
        }
    }

    /// Attaches a party to the line.
    #[must_use]
    pub fn with_party(mut self, party: PartyId) -> Self {
        self.party = Some(party);
        self
    }

    /// Attaches a memo to the line.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true when both sides are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// An unvalidated, unpersisted transaction produced by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Target transaction kind.
    pub transaction_type: TransactionType,
    /// Posting date.
    pub date: NaiveDate,
    /// Header description.
    pub description: String,
    /// Reference to the external source record.
    pub external_ref: ExternalRef,
    /// Invoice number, set on invoice transactions so later payments can
    /// be allocated against them.
    pub invoice_number: Option<String>,
    /// The draft lines.
    pub lines: Vec<TransactionLine>,
    /// Invoice settlement hint, if this payment references invoices.
    pub allocation: Option<InvoiceAllocation>,
}

impl TransactionDraft {
    /// Calculates the draft's debit/credit totals.
    #[must_use]
    pub fn totals(&self) -> TransactionTotals {
        let debit: Decimal = self.lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = self.lines.iter().map(|l| l.credit).sum();
        TransactionTotals::new(debit, credit)
    }
}

/// Transaction totals for validation and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether debits equal credits exactly.
    pub is_balanced: bool,
}

impl TransactionTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}
