//! Mutation type classifiers.
//!
//! One builder per mutation kind turns a typed mutation plus its
//! [`Resolution`] into a balanced [`crate::ledger::TransactionDraft`].
//! Builders are pure: they never touch a store and never persist.
//! Dispatch is an exhaustive match over [`MutationKind`], so a new kind
//! is a compile error here rather than a silent fallthrough.

pub mod context;
pub mod error;
pub mod invoice;
pub mod memorial;
pub mod opening;
pub mod payment;
pub mod transfer;

#[cfg(test)]
mod classify_props;

use boekstroom_shared::types::LedgerCode;

use crate::ledger::TransactionDraft;
use crate::mapping::FallbackHint;
use crate::mutation::{Mutation, MutationKind};
use crate::report::RunWarning;

pub use context::{FallbackAccounts, PartyRole, Resolution, ResolvedAccount};
pub use error::ClassifyError;
pub use opening::OpeningEntry;

/// A draft plus the warnings its construction produced.
#[derive(Debug, Clone)]
pub struct ClassifiedDraft {
    /// The unvalidated transaction draft.
    pub draft: TransactionDraft,
    /// Non-fatal conditions for the run log.
    pub warnings: Vec<RunWarning>,
}

/// A ledger code a mutation references, with the fallback family to use
/// when it has no mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerRequirement {
    /// The referenced code.
    pub code: LedgerCode,
    /// Fallback policy for this position.
    pub hint: FallbackHint,
}

/// Builds a transaction draft for one mutation.
///
/// Opening balance mutations are not handled here; the orchestrator
/// aggregates them into a single synthetic entry via
/// [`opening::build_opening_balance`].
///
/// # Errors
///
/// Returns a [`ClassifyError`] recorded as a per-mutation failure.
pub fn classify(
    mutation: &Mutation,
    resolution: &Resolution,
) -> Result<ClassifiedDraft, ClassifyError> {
    match &mutation.kind {
        MutationKind::OpeningBalance { .. } => Err(ClassifyError::OpeningBalanceMutation {
            mutation: mutation.id,
        }),
        MutationKind::SalesInvoice {
            invoice_number,
            rows,
            vat,
            ..
        } => invoice::build_sales_invoice(mutation, invoice_number.as_deref(), rows, vat, resolution),
        MutationKind::PurchaseInvoice {
            invoice_number,
            rows,
            vat,
            ..
        } => {
            invoice::build_purchase_invoice(mutation, invoice_number.as_deref(), rows, vat, resolution)
        }
        MutationKind::CustomerPayment {
            invoice_number,
            amount,
            rows,
            ..
        } => payment::build_customer_payment(mutation, invoice_number.as_deref(), *amount, rows, resolution),
        MutationKind::SupplierPayment {
            invoice_number,
            amount,
            rows,
            ..
        } => payment::build_supplier_payment(mutation, invoice_number.as_deref(), *amount, rows, resolution),
        MutationKind::MoneyReceived { amount, rows } => {
            transfer::build_money_received(mutation, *amount, rows, resolution)
        }
        MutationKind::MoneySpent { amount, rows } => {
            transfer::build_money_spent(mutation, *amount, rows, resolution)
        }
        MutationKind::Memorial { rows } => memorial::build_memorial(mutation, rows, resolution),
    }
}

/// Lists the ledger codes a mutation references, with fallback hints.
///
/// The resolver walks this list before classification; positions marked
/// [`FallbackHint::Strict`] fail the mutation when unmapped instead of
/// falling back.
#[must_use]
pub fn ledger_requirements(mutation: &Mutation) -> Vec<LedgerRequirement> {
    let mut requirements = Vec::new();
    let mut push = |code: Option<LedgerCode>, hint: FallbackHint| {
        if let Some(code) = code {
            requirements.push(LedgerRequirement { code, hint });
        }
    };

    match &mutation.kind {
        MutationKind::OpeningBalance { rows } => {
            for row in rows {
                push(row.ledger, FallbackHint::Strict);
            }
        }
        MutationKind::SalesInvoice { rows, .. } => {
            for row in rows {
                push(row.ledger, FallbackHint::Income);
            }
        }
        MutationKind::PurchaseInvoice { rows, .. } => {
            for row in rows {
                push(row.ledger, FallbackHint::Expense);
            }
        }
        MutationKind::CustomerPayment { .. } | MutationKind::SupplierPayment { .. } => {
            push(mutation.main_ledger, FallbackHint::Bank);
        }
        MutationKind::MoneyReceived { rows, .. } => {
            push(mutation.main_ledger, FallbackHint::Bank);
            push(rows.first().and_then(|r| r.ledger), FallbackHint::Income);
        }
        MutationKind::MoneySpent { rows, .. } => {
            push(mutation.main_ledger, FallbackHint::Bank);
            push(rows.first().and_then(|r| r.ledger), FallbackHint::Expense);
        }
        MutationKind::Memorial { rows } => {
            push(mutation.main_ledger, FallbackHint::Strict);
            for row in rows {
                push(row.ledger, FallbackHint::Suspense);
            }
        }
    }

    // Keep first occurrence when a code repeats.
    let mut seen = std::collections::HashSet::new();
    requirements.retain(|req| seen.insert(req.code));
    requirements
}

/// Returns the party role a mutation kind requires, if any.
#[must_use]
pub const fn party_requirement(kind: &MutationKind) -> Option<PartyRole> {
    match kind {
        MutationKind::SalesInvoice { .. } | MutationKind::CustomerPayment { .. } => {
            Some(PartyRole::Customer)
        }
        MutationKind::PurchaseInvoice { .. } | MutationKind::SupplierPayment { .. } => {
            Some(PartyRole::Supplier)
        }
        MutationKind::OpeningBalance { .. }
        | MutationKind::MoneyReceived { .. }
        | MutationKind::MoneySpent { .. }
        | MutationKind::Memorial { .. } => None,
    }
}
