//! Double-entry ledger domain.
//!
//! This module implements the target-side transaction model:
//! - Account classifications and their natural balance side
//! - The sign convention engine splitting signed amounts into debit/credit
//! - Transaction drafts (header + lines) built by the classifiers
//! - Business rule validation run before every commit

pub mod error;
pub mod sign;
pub mod types;
pub mod validation;

#[cfg(test)]
mod sign_props;
#[cfg(test)]
mod validation_props;

pub use error::ValidationError;
pub use sign::{split_amount, split_on_side, DebitCredit};
pub use types::{
    AccountType, BalanceSide, ExternalRef, InvoiceAllocation, TransactionDraft, TransactionLine,
    TransactionTotals, TransactionType,
};
pub use validation::{validate_draft, AccountMeta};
