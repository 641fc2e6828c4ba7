//! Property-based tests for draft validation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use boekstroom_shared::types::{AccountId, MutationId};

use super::error::ValidationError;
use super::types::{
    AccountType, ExternalRef, TransactionDraft, TransactionLine, TransactionType,
};
use super::validation::{validate_draft, AccountMeta};

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn leaf_meta(_id: AccountId) -> Option<AccountMeta> {
    Some(AccountMeta {
        account_type: AccountType::Asset,
        is_group: false,
    })
}

fn make_draft(lines: Vec<TransactionLine>) -> TransactionDraft {
    TransactionDraft {
        transaction_type: TransactionType::Journal,
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        description: "prop".to_string(),
        external_ref: ExternalRef::Mutation(MutationId::from(1)),
        invoice_number: None,
        lines,
        allocation: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any draft that splits one amount over a debit and a credit line
    /// validates, regardless of the amount.
    #[test]
    fn prop_mirrored_lines_validate(amount in positive_amount()) {
        let draft = make_draft(vec![
            TransactionLine::debit(AccountId::new(), amount),
            TransactionLine::credit(AccountId::new(), amount),
        ]);
        prop_assert!(validate_draft(&draft, leaf_meta).is_ok());
    }

    /// Any nonzero imbalance is rejected as Unbalanced, and the reported
    /// totals carry the actual sums.
    #[test]
    fn prop_imbalance_rejected(
        amount in positive_amount(),
        skew in positive_amount(),
    ) {
        let draft = make_draft(vec![
            TransactionLine::debit(AccountId::new(), amount + skew),
            TransactionLine::credit(AccountId::new(), amount),
        ]);
        let result = validate_draft(&draft, leaf_meta);
        match result {
            Err(ValidationError::Unbalanced { debit, credit }) => {
                prop_assert_eq!(debit, amount + skew);
                prop_assert_eq!(credit, amount);
            }
            other => prop_assert!(false, "expected Unbalanced, got {:?}", other),
        }
    }

    /// Splitting one side over many lines preserves validity as long as
    /// the pieces sum to the other side.
    #[test]
    fn prop_split_lines_validate(
        pieces in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let total: Decimal = pieces.iter().copied().sum();
        let mut lines = vec![TransactionLine::debit(AccountId::new(), total)];
        lines.extend(
            pieces
                .into_iter()
                .map(|piece| TransactionLine::credit(AccountId::new(), piece)),
        );
        let draft = make_draft(lines);
        prop_assert!(validate_draft(&draft, leaf_meta).is_ok());
    }
}
