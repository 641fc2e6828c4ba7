//! Validation errors for transaction drafts.

use rust_decimal::Decimal;
use thiserror::Error;

use boekstroom_shared::types::AccountId;

/// Errors raised by draft validation; nothing is persisted when any of
/// these occur.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Transaction must have at least 2 lines.
    #[error("Transaction must have at least 2 lines")]
    InsufficientLines,

    /// A line has a negative debit or credit.
    #[error("Line on account {0} has a negative amount")]
    NegativeAmount(AccountId),

    /// A line sets both debit and credit.
    #[error("Line on account {0} sets both debit and credit")]
    BothSidesSet(AccountId),

    /// A line has neither debit nor credit.
    #[error("Line on account {0} has no amount")]
    EmptyLine(AccountId),

    /// Transaction is not balanced.
    #[error("Transaction is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Referenced account does not exist in the ledger store.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Referenced account is a group account; only leaves accept postings.
    #[error("Account {0} is a group account and cannot be posted to")]
    GroupAccount(AccountId),
}

impl ValidationError {
    /// Returns the error code for reports and structured logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::BothSidesSet(_) => "BOTH_SIDES_SET",
            Self::EmptyLine(_) => "EMPTY_LINE",
            Self::Unbalanced { .. } => "UNBALANCED_TRANSACTION",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::GroupAccount(_) => "GROUP_ACCOUNT",
        }
    }
}
