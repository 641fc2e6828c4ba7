//! Sign convention engine.
//!
//! Splits a signed external amount into a debit/credit pair according to an
//! account's natural balance side. The sign of the amount, never the
//! mutation kind, drives the split; memorial bookings and opening balances
//! go through the same two functions as ordinary transactions.

use rust_decimal::Decimal;

use super::types::{AccountType, BalanceSide};

/// A debit/credit pair; at most one side is nonzero, both non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebitCredit {
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

impl DebitCredit {
    /// Returns the pair with sides swapped.
    #[must_use]
    pub const fn swapped(self) -> Self {
        Self {
            debit: self.credit,
            credit: self.debit,
        }
    }

    /// Returns true when both sides are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// Splits a signed amount onto the given side.
///
/// A positive amount lands on `side`; a negative amount lands on the
/// opposite side with its magnitude.
#[must_use]
pub fn split_on_side(side: BalanceSide, amount: Decimal) -> DebitCredit {
    let positive = amount.max(Decimal::ZERO);
    let negative = (-amount).max(Decimal::ZERO);
    match side {
        BalanceSide::Debit => DebitCredit {
            debit: positive,
            credit: negative,
        },
        BalanceSide::Credit => DebitCredit {
            debit: negative,
            credit: positive,
        },
    }
}

/// Splits a signed amount according to an account type's natural side.
///
/// Natural-debit accounts (Asset, Expense): `debit = max(amount, 0)`,
/// `credit = max(-amount, 0)`. Natural-credit accounts (Liability, Equity,
/// Income): mirrored.
#[must_use]
pub fn split_amount(account_type: AccountType, amount: Decimal) -> DebitCredit {
    split_on_side(account_type.natural_side(), amount)
}
