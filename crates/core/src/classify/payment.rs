//! Customer and supplier payment builders.
//!
//! Payments move money between a bank account (the mutation's main
//! ledger) and the receivable/payable control account of the party. When
//! the mutation references invoice numbers, the draft carries an
//! allocation so the ledger store's reporting layer can close those
//! invoices instead of merely recording the movement.

use rust_decimal::Decimal;

use crate::ledger::{
    split_on_side, BalanceSide, ExternalRef, InvoiceAllocation, TransactionDraft, TransactionLine,
    TransactionType,
};
use crate::mutation::{Mutation, MutationRow};

use super::context::Resolution;
use super::error::ClassifyError;
use super::ClassifiedDraft;

/// Builds a customer payment: bank debited, receivable credited.
pub fn build_customer_payment(
    mutation: &Mutation,
    invoice_number: Option<&str>,
    amount: Option<Decimal>,
    rows: &[MutationRow],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    build_payment(
        mutation,
        invoice_number,
        amount,
        rows,
        resolution,
        PaymentDirection::Incoming,
    )
}

/// Builds a supplier payment: payable debited, bank credited.
pub fn build_supplier_payment(
    mutation: &Mutation,
    invoice_number: Option<&str>,
    amount: Option<Decimal>,
    rows: &[MutationRow],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    build_payment(
        mutation,
        invoice_number,
        amount,
        rows,
        resolution,
        PaymentDirection::Outgoing,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentDirection {
    Incoming,
    Outgoing,
}

impl PaymentDirection {
    /// Side the bank takes for a positive amount; the control account
    /// takes the opposite. A negative amount (refund) flips both.
    const fn bank_side(self) -> BalanceSide {
        match self {
            Self::Incoming => BalanceSide::Debit,
            Self::Outgoing => BalanceSide::Credit,
        }
    }
}

/// Resolves the effective payment amount: the header amount, or the sum
/// of row magnitudes when the header is zero or absent.
fn effective_amount(amount: Option<Decimal>, rows: &[MutationRow]) -> Decimal {
    match amount {
        Some(value) if !value.is_zero() => value,
        _ => rows.iter().map(|row| row.amount.abs()).sum(),
    }
}

fn build_payment(
    mutation: &Mutation,
    invoice_number: Option<&str>,
    amount: Option<Decimal>,
    rows: &[MutationRow],
    resolution: &Resolution,
    direction: PaymentDirection,
) -> Result<ClassifiedDraft, ClassifyError> {
    let party = resolution.party.ok_or(ClassifyError::MissingParty {
        mutation: mutation.id,
    })?;

    let amount = effective_amount(amount, rows);
    if amount.is_zero() {
        return Err(ClassifyError::ZeroAmount {
            mutation: mutation.id,
        });
    }

    let bank = match mutation.main_ledger {
        Some(code) => resolution.require(code, mutation.id)?,
        None => resolution.fallbacks.bank,
    };
    let control = match direction {
        PaymentDirection::Incoming => resolution.fallbacks.receivable,
        PaymentDirection::Outgoing => resolution.fallbacks.payable,
    };

    let bank_line =
        TransactionLine::from_split(bank.account, split_on_side(direction.bank_side(), amount));
    let control_line = TransactionLine::from_split(
        control.account,
        split_on_side(direction.bank_side().opposite(), amount),
    )
    .with_party(party);

    let allocation = invoice_number.and_then(|numbers| {
        let invoice_numbers: Vec<String> = numbers
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        if invoice_numbers.is_empty() {
            None
        } else {
            Some(InvoiceAllocation {
                party,
                invoice_numbers,
            })
        }
    });

    Ok(ClassifiedDraft {
        draft: TransactionDraft {
            transaction_type: TransactionType::Payment,
            date: mutation.date,
            description: mutation.description.clone(),
            external_ref: ExternalRef::Mutation(mutation.id),
            invoice_number: None,
            lines: vec![bank_line, control_line],
            allocation,
        },
        warnings: Vec::new(),
    })
}
