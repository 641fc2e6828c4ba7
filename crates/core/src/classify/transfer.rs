//! Money received / money spent builders.
//!
//! Plain money movements without an invoice: a two-line journal between
//! the bank account (main ledger) and a counter account taken from the
//! first row. No party, no allocation.

use rust_decimal::Decimal;

use crate::ledger::{
    split_on_side, BalanceSide, ExternalRef, TransactionDraft, TransactionLine, TransactionType,
};
use crate::mutation::{Mutation, MutationRow};
use crate::report::RunWarning;

use super::context::Resolution;
use super::error::ClassifyError;
use super::ClassifiedDraft;

/// Builds a money-received journal: bank debited, counter credited.
pub fn build_money_received(
    mutation: &Mutation,
    amount: Option<Decimal>,
    rows: &[MutationRow],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    build_transfer(mutation, amount, rows, resolution, BalanceSide::Debit)
}

/// Builds a money-spent journal: bank credited, counter debited.
pub fn build_money_spent(
    mutation: &Mutation,
    amount: Option<Decimal>,
    rows: &[MutationRow],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    build_transfer(mutation, amount, rows, resolution, BalanceSide::Credit)
}

fn build_transfer(
    mutation: &Mutation,
    amount: Option<Decimal>,
    rows: &[MutationRow],
    resolution: &Resolution,
    bank_side: BalanceSide,
) -> Result<ClassifiedDraft, ClassifyError> {
    let amount = match amount {
        Some(value) if !value.is_zero() => value,
        _ => rows.iter().map(|row| row.amount.abs()).sum(),
    };
    if amount.is_zero() {
        return Err(ClassifyError::ZeroAmount {
            mutation: mutation.id,
        });
    }

    let bank = match mutation.main_ledger {
        Some(code) => resolution.require(code, mutation.id)?,
        None => resolution.fallbacks.bank,
    };
    let counter = match rows.first().and_then(|row| row.ledger) {
        Some(code) => resolution.require(code, mutation.id)?,
        None => match bank_side {
            BalanceSide::Debit => resolution.fallbacks.income,
            BalanceSide::Credit => resolution.fallbacks.expense,
        },
    };

    let mut warnings = Vec::new();
    if rows.len() > 1 {
        warnings.push(RunWarning::ExtraRowsIgnored {
            mutation: mutation.id,
            ignored: rows.len() - 1,
        });
    }

    let bank_line = TransactionLine::from_split(bank.account, split_on_side(bank_side, amount));
    let counter_line = TransactionLine::from_split(
        counter.account,
        split_on_side(bank_side.opposite(), amount),
    );

    Ok(ClassifiedDraft {
        draft: TransactionDraft {
            transaction_type: TransactionType::Journal,
            date: mutation.date,
            description: mutation.description.clone(),
            external_ref: ExternalRef::Mutation(mutation.id),
            invoice_number: None,
            lines: vec![bank_line, counter_line],
            allocation: None,
        },
        warnings,
    })
}
