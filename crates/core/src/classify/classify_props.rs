//! Property-based tests for the classifiers.
//!
//! The balance invariant: whatever rows a mutation carries, every draft a
//! classifier produces sums debits equal to credits, exactly.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use boekstroom_shared::types::{AccountId, LedgerCode, MutationId, PartyId};

use crate::ledger::AccountType;
use crate::mutation::{Mutation, MutationKind, MutationRow};

use super::context::fixtures::fallback_accounts;
use super::context::{Resolution, ResolvedAccount};
use super::memorial::build_memorial;
use super::opening::{build_opening_balance, OpeningEntry};
use super::invoice::build_sales_invoice;

fn nonzero_amount() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        (1i64..50_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        (1i64..50_000_000i64).prop_map(|cents| Decimal::new(-cents, 2)),
    ]
}

fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Income),
        Just(AccountType::Expense),
    ]
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Memorial drafts balance for any mix of signed rows.
    #[test]
    fn prop_memorial_always_balances(
        amounts in prop::collection::vec(nonzero_amount(), 1..10),
    ) {
        let mut resolution = Resolution::new(fallback_accounts());
        resolution.insert(LedgerCode(1), ResolvedAccount {
            account: AccountId::new(),
            account_type: AccountType::Equity,
        });
        let rows: Vec<MutationRow> = amounts
            .iter()
            .enumerate()
            .map(|(index, amount)| {
                let code = LedgerCode(100 + i64::try_from(index).unwrap());
                resolution.insert(code, ResolvedAccount {
                    account: AccountId::new(),
                    account_type: AccountType::Expense,
                });
                MutationRow { ledger: Some(code), amount: *amount, description: None }
            })
            .collect();
        let mutation = Mutation {
            id: MutationId::from(1),
            date: date(),
            description: "prop".to_string(),
            main_ledger: Some(LedgerCode(1)),
            kind: MutationKind::Memorial { rows: rows.clone() },
        };

        let draft = build_memorial(&mutation, &rows, &resolution).unwrap().draft;
        let totals = draft.totals();
        prop_assert!(totals.is_balanced, "memorial unbalanced: {totals:?}");
    }

    /// Sales invoice drafts balance for any mix of signed rows.
    #[test]
    fn prop_sales_invoice_balances_or_rejects(
        amounts in prop::collection::vec(nonzero_amount(), 1..8),
    ) {
        let mut resolution = Resolution::new(fallback_accounts());
        resolution.set_party(PartyId::new());
        let rows: Vec<MutationRow> = amounts
            .iter()
            .map(|amount| MutationRow { ledger: None, amount: *amount, description: None })
            .collect();
        let mutation = Mutation {
            id: MutationId::from(2),
            date: date(),
            description: "prop".to_string(),
            main_ledger: None,
            kind: MutationKind::SalesInvoice {
                relation: None,
                invoice_number: None,
                rows: rows.clone(),
                vat: vec![],
            },
        };

        // Rows may net to zero, which is a rejection, not an unbalanced draft.
        if let Ok(classified) = build_sales_invoice(&mutation, None, &rows, &[], &resolution) {
            prop_assert!(classified.draft.totals().is_balanced);
        }
    }

    /// Opening balance closure: any residual is absorbed and the draft
    /// balances to exactly zero difference.
    #[test]
    fn prop_opening_balance_closure(
        balances in prop::collection::vec(
            (account_type_strategy(), nonzero_amount()),
            1..12,
        ),
    ) {
        let entries: Vec<OpeningEntry> = balances
            .iter()
            .enumerate()
            .map(|(index, (account_type, balance))| OpeningEntry {
                ledger: Some(LedgerCode(i64::try_from(index).unwrap())),
                account: ResolvedAccount {
                    account: AccountId::new(),
                    account_type: *account_type,
                },
                balance: *balance,
            })
            .collect();
        let balancing = ResolvedAccount {
            account: AccountId::new(),
            account_type: AccountType::Equity,
        };

        // All-P&L inputs legitimately produce nothing to post.
        if let Ok(classified) = build_opening_balance(date(), &entries, balancing) {
            let totals = classified.draft.totals();
            prop_assert!(totals.is_balanced);
            prop_assert_eq!(totals.difference(), Decimal::ZERO);
        }
    }
}
