//! Business rule validation for transaction drafts.
//!
//! Validation is an explicit, synchronous function: the committer
//! pre-fetches account metadata and passes a lookup, so the rules here are
//! testable without any store.

use super::error::ValidationError;
use super::types::{AccountType, TransactionDraft};
use boekstroom_shared::types::AccountId;
use rust_decimal::Decimal;

/// Account metadata needed to validate a draft line.
#[derive(Debug, Clone, Copy)]
pub struct AccountMeta {
    /// Root classification of the account.
    pub account_type: AccountType,
    /// Group accounts structure the chart and never accept postings.
    pub is_group: bool,
}

/// Validates a transaction draft against the commit invariants.
///
/// Checks, in order: minimum line count, per-line side exclusivity and
/// non-negativity, account existence and leaf-ness, and exact balance.
/// Returns the first violated invariant.
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the violation; the draft must
/// not be persisted in that case.
pub fn validate_draft<F>(draft: &TransactionDraft, account_meta: F) -> Result<(), ValidationError>
where
    F: Fn(AccountId) -> Option<AccountMeta>,
{
    if draft.lines.len() < 2 {
        return Err(ValidationError::InsufficientLines);
    }

    for line in &draft.lines {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(ValidationError::NegativeAmount(line.account));
        }
        if !line.debit.is_zero() && !line.credit.is_zero() {
            return Err(ValidationError::BothSidesSet(line.account));
        }
        if line.is_empty() {
            return Err(ValidationError::EmptyLine(line.account));
        }

        let meta =
            account_meta(line.account).ok_or(ValidationError::AccountNotFound(line.account))?;
        if meta.is_group {
            return Err(ValidationError::GroupAccount(line.account));
        }
    }

    let totals = draft.totals();
    if !totals.is_balanced {
        return Err(ValidationError::Unbalanced {
            debit: totals.debit,
            credit: totals.credit,
        });
    }

    Ok(())
}
