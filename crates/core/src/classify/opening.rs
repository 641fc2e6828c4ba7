//! Opening balance builder.
//!
//! All type-0 mutations of a migration aggregate into one synthetic
//! transaction establishing starting balances. Each account contributes
//! one line through the sign convention engine; profit-and-loss accounts
//! are excluded (opening entries are balance-sheet-only) and any residual
//! lands on the configured balancing equity account, so the committed
//! entry balances exactly.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use boekstroom_shared::types::LedgerCode;

use crate::ledger::{
    split_amount, split_on_side, BalanceSide, ExternalRef, TransactionDraft, TransactionLine,
    TransactionType,
};
use crate::report::RunWarning;

use super::context::ResolvedAccount;
use super::error::ClassifyError;
use super::ClassifiedDraft;

/// One account's starting balance, already resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningEntry {
    /// The source ledger code, kept for warnings.
    pub ledger: Option<LedgerCode>,
    /// The resolved internal account.
    pub account: ResolvedAccount,
    /// Signed starting balance relative to the account's natural side.
    pub balance: Decimal,
}

/// Builds the synthetic opening balance draft.
///
/// Duplicate accounts keep their first occurrence; zero balances and
/// profit-and-loss accounts are skipped with a warning. The residual
/// between total debits and credits, whatever its cause, is absorbed by
/// `balancing` — never by an income or expense account.
///
/// # Errors
///
/// Returns [`ClassifyError::EmptyOpeningBalance`] when nothing remains to
/// post after the skips.
pub fn build_opening_balance(
    date: NaiveDate,
    entries: &[OpeningEntry],
    balancing: ResolvedAccount,
) -> Result<ClassifiedDraft, ClassifyError> {
    let mut warnings = Vec::new();
    let mut lines = Vec::with_capacity(entries.len() + 1);
    let mut seen = HashSet::new();

    for entry in entries {
        if entry.balance.is_zero() {
            continue;
        }
        if entry.account.account_type.is_profit_and_loss() {
            warnings.push(RunWarning::ProfitAndLossOpeningAccount {
                account: entry.account.account,
            });
            continue;
        }
        if !seen.insert(entry.account.account) {
            warnings.push(RunWarning::SkippedOpeningRow {
                ledger: entry.ledger,
                reason: "duplicate account".to_string(),
            });
            continue;
        }
        lines.push(
            TransactionLine::from_split(
                entry.account.account,
                split_amount(entry.account.account_type, entry.balance),
            )
            .with_description("Opening balance"),
        );
    }

    if lines.is_empty() {
        return Err(ClassifyError::EmptyOpeningBalance);
    }

    let debit: Decimal = lines.iter().map(|line| line.debit).sum();
    let credit: Decimal = lines.iter().map(|line| line.credit).sum();
    let residual = debit - credit;
    if !residual.is_zero() {
        lines.push(
            TransactionLine::from_split(
                balancing.account,
                split_on_side(BalanceSide::Credit, residual),
            )
            .with_description("Balancing entry for opening balances"),
        );
    }

    Ok(ClassifiedDraft {
        draft: TransactionDraft {
            transaction_type: TransactionType::OpeningBalance,
            date,
            description: format!("Opening balances as of {date}"),
            external_ref: ExternalRef::OpeningBalance,
            invoice_number: None,
            lines,
            allocation: None,
        },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use boekstroom_shared::types::AccountId;

    use crate::ledger::AccountType;

    use super::*;

    fn resolved(account_type: AccountType) -> ResolvedAccount {
        ResolvedAccount {
            account: AccountId::new(),
            account_type,
        }
    }

    fn balancing() -> ResolvedAccount {
        resolved(AccountType::Equity)
    }

    fn entry(account_type: AccountType, balance: Decimal) -> OpeningEntry {
        OpeningEntry {
            ledger: Some(LedgerCode(1000)),
            account: resolved(account_type),
            balance,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    #[test]
    fn test_balanced_entries_need_no_balancing_line() {
        let entries = vec![
            entry(AccountType::Asset, dec!(1500.00)),
            entry(AccountType::Equity, dec!(1500.00)),
        ];
        let classified = build_opening_balance(date(), &entries, balancing()).unwrap();
        let draft = classified.draft;
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].debit, dec!(1500.00));
        assert_eq!(draft.lines[1].credit, dec!(1500.00));
        assert!(draft.totals().is_balanced);
        assert_eq!(draft.external_ref, ExternalRef::OpeningBalance);
    }

    #[test]
    fn test_residual_absorbed_by_balancing_account() {
        let balancing_account = balancing();
        let entries = vec![
            entry(AccountType::Asset, dec!(1000.00)),
            entry(AccountType::Liability, dec!(400.00)),
            // 600.00 residual left to absorb.
        ];
        let classified = build_opening_balance(date(), &entries, balancing_account).unwrap();
        let draft = classified.draft;
        assert_eq!(draft.lines.len(), 3);
        let balance_line = &draft.lines[2];
        assert_eq!(balance_line.account, balancing_account.account);
        assert_eq!(balance_line.credit, dec!(600.00));
        assert!(draft.totals().is_balanced);
        assert_eq!(draft.totals().difference(), Decimal::ZERO);
    }

    #[test]
    fn test_negative_residual_debits_balancing_account() {
        let balancing_account = balancing();
        let entries = vec![entry(AccountType::Liability, dec!(250.00))];
        let classified = build_opening_balance(date(), &entries, balancing_account).unwrap();
        let draft = classified.draft;
        let balance_line = &draft.lines[1];
        assert_eq!(balance_line.debit, dec!(250.00));
        assert!(draft.totals().is_balanced);
    }

    #[test]
    fn test_profit_and_loss_accounts_skipped() {
        let entries = vec![
            entry(AccountType::Asset, dec!(100.00)),
            entry(AccountType::Income, dec!(40.00)),
            entry(AccountType::Expense, dec!(-10.00)),
        ];
        let classified = build_opening_balance(date(), &entries, balancing()).unwrap();
        // Asset line + balancing line only.
        assert_eq!(classified.draft.lines.len(), 2);
        assert_eq!(
            classified
                .warnings
                .iter()
                .filter(|w| matches!(w, RunWarning::ProfitAndLossOpeningAccount { .. }))
                .count(),
            2
        );
        assert!(classified.draft.totals().is_balanced);
    }

    #[test]
    fn test_duplicate_accounts_keep_first() {
        let account = resolved(AccountType::Asset);
        let entries = vec![
            OpeningEntry {
                ledger: Some(LedgerCode(1)),
                account,
                balance: dec!(10.00),
            },
            OpeningEntry {
                ledger: Some(LedgerCode(2)),
                account,
                balance: dec!(99.00),
            },
        ];
        let classified = build_opening_balance(date(), &entries, balancing()).unwrap();
        assert_eq!(classified.draft.lines[0].debit, dec!(10.00));
        assert_eq!(classified.warnings.len(), 1);
    }

    #[test]
    fn test_natural_sides_respected() {
        let entries = vec![
            entry(AccountType::Asset, dec!(-25.00)),
            entry(AccountType::Equity, dec!(-25.00)),
        ];
        let classified = build_opening_balance(date(), &entries, balancing()).unwrap();
        let draft = classified.draft;
        // Negative asset balance credits; negative equity balance debits.
        assert_eq!(draft.lines[0].credit, dec!(25.00));
        assert_eq!(draft.lines[1].debit, dec!(25.00));
        assert!(draft.totals().is_balanced);
    }

    #[test]
    fn test_all_zero_is_an_error() {
        let entries = vec![entry(AccountType::Asset, Decimal::ZERO)];
        assert!(matches!(
            build_opening_balance(date(), &entries, balancing()),
            Err(ClassifyError::EmptyOpeningBalance)
        ));
    }
}
