//! Sales and purchase invoice builders.
//!
//! A sales invoice debits the receivable control account for the gross
//! total and credits one income line per row; VAT lines credit the VAT
//! payable account. A purchase invoice is the mirror image. Row signs are
//! respected throughout, so negative rows render credit notes correctly
//! without a separate code path.

use rust_decimal::Decimal;

use crate::ledger::{
    split_on_side, BalanceSide, ExternalRef, TransactionDraft, TransactionLine, TransactionType,
};
use crate::mutation::{Mutation, MutationRow, VatLine};
use crate::report::RunWarning;

use super::context::{Resolution, ResolvedAccount};
use super::error::ClassifyError;
use super::ClassifiedDraft;

/// Builds a sales invoice draft: receivable against income.
pub fn build_sales_invoice(
    mutation: &Mutation,
    invoice_number: Option<&str>,
    rows: &[MutationRow],
    vat: &[VatLine],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    build_invoice(
        mutation,
        invoice_number,
        rows,
        vat,
        resolution,
        InvoiceDirection::Sales,
    )
}

/// Builds a purchase invoice draft: expense against payable.
pub fn build_purchase_invoice(
    mutation: &Mutation,
    invoice_number: Option<&str>,
    rows: &[MutationRow],
    vat: &[VatLine],
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    build_invoice(
        mutation,
        invoice_number,
        rows,
        vat,
        resolution,
        InvoiceDirection::Purchase,
    )
}

/// Which way the invoice flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvoiceDirection {
    Sales,
    Purchase,
}

impl InvoiceDirection {
    /// Side the party control account naturally takes for a positive
    /// invoice: receivables are debited, payables credited.
    const fn control_side(self) -> BalanceSide {
        match self {
            Self::Sales => BalanceSide::Debit,
            Self::Purchase => BalanceSide::Credit,
        }
    }

    /// Side a positive row amount takes: income is credited on sales,
    /// expense debited on purchases.
    const fn row_side(self) -> BalanceSide {
        self.control_side().opposite()
    }
}

fn build_invoice(
    mutation: &Mutation,
    invoice_number: Option<&str>,
    rows: &[MutationRow],
    vat: &[VatLine],
    resolution: &Resolution,
    direction: InvoiceDirection,
) -> Result<ClassifiedDraft, ClassifyError> {
    let party = resolution.party.ok_or(ClassifyError::MissingParty {
        mutation: mutation.id,
    })?;

    let fallback_row_account = match direction {
        InvoiceDirection::Sales => resolution.fallbacks.income,
        InvoiceDirection::Purchase => resolution.fallbacks.expense,
    };
    let control_account = match direction {
        InvoiceDirection::Sales => resolution.fallbacks.receivable,
        InvoiceDirection::Purchase => resolution.fallbacks.payable,
    };

    let mut lines = Vec::with_capacity(rows.len() + vat.len() + 1);
    let mut gross = Decimal::ZERO;

    for row in rows {
        if row.amount.is_zero() {
            continue;
        }
        let account = match row.ledger {
            Some(code) => resolution.require(code, mutation.id)?,
            None => fallback_row_account,
        };
        gross += row.amount;
        let mut line =
            TransactionLine::from_split(account.account, split_on_side(direction.row_side(), row.amount));
        if let Some(description) = &row.description {
            line = line.with_description(description.clone());
        }
        lines.push(line);
    }

    for vat_line in vat {
        if vat_line.amount.is_zero() {
            continue;
        }
        let vat_account: ResolvedAccount = match direction {
            InvoiceDirection::Sales => resolution.fallbacks.vat_payable,
            InvoiceDirection::Purchase => resolution.fallbacks.vat_receivable,
        }
        .ok_or(ClassifyError::VatAccountNotConfigured {
            mutation: mutation.id,
        })?;
        gross += vat_line.amount;
        let mut line = TransactionLine::from_split(
            vat_account.account,
            split_on_side(direction.row_side(), vat_line.amount),
        );
        if let Some(code) = &vat_line.code {
            line = line.with_description(format!("VAT {code}"));
        }
        lines.push(line);
    }

    if gross.is_zero() || lines.is_empty() {
        return Err(ClassifyError::ZeroAmount {
            mutation: mutation.id,
        });
    }

    lines.insert(
        0,
        TransactionLine::from_split(
            control_account.account,
            split_on_side(direction.control_side(), gross),
        )
        .with_party(party),
    );

    let warnings: Vec<RunWarning> = Vec::new();
    Ok(ClassifiedDraft {
        draft: TransactionDraft {
            transaction_type: match direction {
                InvoiceDirection::Sales => TransactionType::SalesInvoice,
                InvoiceDirection::Purchase => TransactionType::PurchaseInvoice,
            },
            date: mutation.date,
            description: mutation.description.clone(),
            external_ref: ExternalRef::Mutation(mutation.id),
            invoice_number: invoice_number.map(str::to_string),
            lines,
            allocation: None,
        },
        warnings,
    })
}
