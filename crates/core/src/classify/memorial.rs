//! Memorial (manual journal) booking builder.
//!
//! The mutation's main ledger is the source account; each row ledger is a
//! destination. A positive row amount credits the row account and debits
//! the main account; a negative row amount does the reverse. The sign of
//! the amount alone governs direction — not the mutation kind, not the
//! account type, and not whichever direction is more common.

use rust_decimal::Decimal;

use crate::ledger::{
    split_on_side, BalanceSide, ExternalRef, TransactionDraft, TransactionLine, TransactionType,
};
use crate::mutation::{Mutation, MutationRow};

use super::context::Resolution;
use super::error::ClassifyError;
use super::ClassifiedDraft;

/// Builds a memorial journal draft.
///
/// Rows are posted via `split_on_side(Credit, amount)`; the main account
/// receives the exact opposite of the rows' net, so the set balances by
/// construction. Rows netting to zero balance among themselves and no
/// main line is emitted.
pub fn build_memorial(
    mutation: &Mutation,
    rows: &[MutationRow],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    let main_code = mutation
        .main_ledger
        .ok_or(ClassifyError::MissingMainLedger {
            mutation: mutation.id,
        })?;
    let main = resolution.require(main_code, mutation.id)?;

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let mut net = Decimal::ZERO;

    for row in rows {
        if row.amount.is_zero() {
            continue;
        }
        let account = match row.ledger {
            Some(code) => resolution.require(code, mutation.id)?,
            None => resolution.fallbacks.suspense,
        };
        net += row.amount;
        let mut line = TransactionLine::from_split(
            account.account,
            split_on_side(BalanceSide::Credit, row.amount),
        );
        if let Some(description) = &row.description {
            line = line.with_description(description.clone());
        }
        lines.push(line);
    }

    if lines.is_empty() {
        return Err(ClassifyError::ZeroAmount {
            mutation: mutation.id,
        });
    }

    if !net.is_zero() {
        lines.push(TransactionLine::from_split(
            main.account,
            split_on_side(BalanceSide::Debit, net),
        ));
    }

    Ok(ClassifiedDraft {
        draft: TransactionDraft {
            transaction_type: TransactionType::Journal,
            date: mutation.date,
            description: mutation.description.clone(),
            external_ref: ExternalRef::Mutation(mutation.id),
            invoice_number: None,
            lines,
            allocation: None,
        },
        warnings: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use boekstroom_shared::types::{AccountId, LedgerCode, MutationId};

    use crate::classify::context::fixtures::fallback_accounts;
    use crate::ledger::AccountType;
    use crate::mutation::MutationKind;

    use super::super::context::ResolvedAccount;
    use super::*;

    const MAIN: LedgerCode = LedgerCode(100);
    const ROW: LedgerCode = LedgerCode(200);

    fn equity(account: AccountId) -> ResolvedAccount {
        ResolvedAccount {
            account,
            account_type: AccountType::Equity,
        }
    }

    fn memorial(rows: Vec<MutationRow>) -> Mutation {
        Mutation {
            id: MutationId::from(900),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            description: "Herverdeling reserves".to_string(),
            main_ledger: Some(MAIN),
            kind: MutationKind::Memorial { rows },
        }
    }

    fn resolution(main: AccountId, row: AccountId) -> Resolution {
        let mut resolution = Resolution::new(fallback_accounts());
        resolution.insert(MAIN, equity(main));
        resolution.insert(ROW, equity(row));
        resolution
    }

    fn row(amount: Decimal) -> MutationRow {
        MutationRow {
            ledger: Some(ROW),
            amount,
            description: None,
        }
    }

    #[test]
    fn test_positive_row_credits_row_debits_main() {
        let (main, row_account) = (AccountId::new(), AccountId::new());
        let rows = vec![row(dec!(1000))];
        let mutation = memorial(rows.clone());
        let draft = build_memorial(&mutation, &rows, &resolution(main, row_account))
            .unwrap()
            .draft;

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].account, row_account);
        assert_eq!(draft.lines[0].credit, dec!(1000));
        assert_eq!(draft.lines[0].debit, dec!(0));
        assert_eq!(draft.lines[1].account, main);
        assert_eq!(draft.lines[1].debit, dec!(1000));
        assert_eq!(draft.lines[1].credit, dec!(0));
        assert!(draft.totals().is_balanced);
    }

    #[test]
    fn test_negative_row_debits_row_credits_main() {
        let (main, row_account) = (AccountId::new(), AccountId::new());
        let rows = vec![row(dec!(-1000))];
        let mutation = memorial(rows.clone());
        let draft = build_memorial(&mutation, &rows, &resolution(main, row_account))
            .unwrap()
            .draft;

        assert_eq!(draft.lines[0].account, row_account);
        assert_eq!(draft.lines[0].debit, dec!(1000));
        assert_eq!(draft.lines[1].account, main);
        assert_eq!(draft.lines[1].credit, dec!(1000));
        assert!(draft.totals().is_balanced);
    }

    #[test]
    fn test_mixed_rows_main_takes_net() {
        let (main, row_account) = (AccountId::new(), AccountId::new());
        let rows = vec![row(dec!(300)), row(dec!(-100))];
        let mutation = memorial(rows.clone());
        let draft = build_memorial(&mutation, &rows, &resolution(main, row_account))
            .unwrap()
            .draft;

        // Rows: credit 300, debit 100. Net +200 -> main debited 200.
        assert_eq!(draft.lines.len(), 3);
        assert_eq!(draft.lines[2].account, main);
        assert_eq!(draft.lines[2].debit, dec!(200));
        assert!(draft.totals().is_balanced);
    }

    #[test]
    fn test_rows_netting_zero_need_no_main_line() {
        let (main, row_account) = (AccountId::new(), AccountId::new());
        let rows = vec![row(dec!(150)), row(dec!(-150))];
        let mutation = memorial(rows.clone());
        let draft = build_memorial(&mutation, &rows, &resolution(main, row_account))
            .unwrap()
            .draft;

        assert_eq!(draft.lines.len(), 2);
        assert!(draft.lines.iter().all(|line| line.account == row_account));
        assert!(draft.totals().is_balanced);
    }

    #[test]
    fn test_zero_rows_skipped_all_zero_rejected() {
        let (main, row_account) = (AccountId::new(), AccountId::new());
        let rows = vec![row(Decimal::ZERO)];
        let mutation = memorial(rows.clone());
        let result = build_memorial(&mutation, &rows, &resolution(main, row_account));
        assert!(matches!(result, Err(ClassifyError::ZeroAmount { .. })));
    }

    #[test]
    fn test_missing_main_ledger_rejected() {
        let (main, row_account) = (AccountId::new(), AccountId::new());
        let rows = vec![row(dec!(10))];
        let mut mutation = memorial(rows.clone());
        mutation.main_ledger = None;
        let result = build_memorial(&mutation, &rows, &resolution(main, row_account));
        assert!(matches!(
            result,
            Err(ClassifyError::MissingMainLedger { .. })
        ));
    }

    #[test]
    fn test_unmapped_main_ledger_rejected() {
        let rows = vec![row(dec!(10))];
        let mutation = memorial(rows.clone());
        // Resolution lacks the main ledger mapping entirely.
        let mut bare = Resolution::new(fallback_accounts());
        bare.insert(ROW, equity(AccountId::new()));
        let result = build_memorial(&mutation, &rows, &bare);
        assert!(matches!(
            result,
            Err(ClassifyError::UnresolvedLedger { ledger, .. }) if ledger == MAIN
        ));
    }
}
