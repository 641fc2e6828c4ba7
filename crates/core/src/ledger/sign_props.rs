//! Property-based tests for the sign convention engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::sign::{split_amount, split_on_side};
use super::types::{AccountType, BalanceSide};

/// Strategy to generate a signed amount in cents.
fn signed_amount() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate an account type.
fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Income),
        Just(AccountType::Expense),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Sign symmetry: split(type, a) and split(type, -a) produce swapped
    /// debit/credit values of equal magnitude.
    #[test]
    fn prop_sign_symmetry(
        account_type in account_type_strategy(),
        amount in signed_amount(),
    ) {
        let forward = split_amount(account_type, amount);
        let reverse = split_amount(account_type, -amount);
        prop_assert_eq!(forward.debit, reverse.credit);
        prop_assert_eq!(forward.credit, reverse.debit);
    }

    /// Exactly one side is nonzero for nonzero amounts, and the nonzero
    /// side carries the amount's magnitude.
    #[test]
    fn prop_one_side_carries_magnitude(
        account_type in account_type_strategy(),
        amount in signed_amount(),
    ) {
        let split = split_amount(account_type, amount);
        prop_assert!(split.debit >= Decimal::ZERO);
        prop_assert!(split.credit >= Decimal::ZERO);
        prop_assert_eq!(split.debit - split.credit,
            match account_type.natural_side() {
                BalanceSide::Debit => amount,
                BalanceSide::Credit => -amount,
            });
        if !amount.is_zero() {
            prop_assert!(split.debit.is_zero() != split.credit.is_zero());
        }
        prop_assert_eq!(split.debit.max(split.credit), amount.abs());
    }

    /// The two split sides always reconstruct the signed amount relative
    /// to the chosen side.
    #[test]
    fn prop_split_on_side_roundtrip(amount in signed_amount()) {
        let debit_side = split_on_side(BalanceSide::Debit, amount);
        prop_assert_eq!(debit_side.debit - debit_side.credit, amount);

        let credit_side = split_on_side(BalanceSide::Credit, amount);
        prop_assert_eq!(credit_side.credit - credit_side.debit, amount);
    }
}
