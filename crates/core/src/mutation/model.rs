//! Typed mutation model.
//!
//! The numeric type code of the wire format becomes a sum type carrying
//! only the fields relevant to that kind, so classification dispatches by
//! exhaustive match and an unknown code is a conversion error rather than
//! a silent fallthrough.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{round_amount, LedgerCode, MutationId, RelationCode};

use super::error::MutationError;
use super::raw::RawMutation;

/// Type codes fixed by the source system.
mod type_code {
    pub const OPENING_BALANCE: i32 = 0;
    pub const PURCHASE_INVOICE: i32 = 1;
    pub const SALES_INVOICE: i32 = 2;
    pub const CUSTOMER_PAYMENT: i32 = 3;
    pub const SUPPLIER_PAYMENT: i32 = 4;
    pub const MONEY_RECEIVED: i32 = 5;
    pub const MONEY_SPENT: i32 = 6;
    pub const MEMORIAL: i32 = 7;
}

/// A typed row entry with its amount normalized to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRow {
    /// Ledger code of the row account.
    pub ledger: Option<LedgerCode>,
    /// Signed row amount.
    pub amount: Decimal,
    /// Row description.
    pub description: Option<String>,
}

/// A typed VAT line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatLine {
    /// VAT code as reported by the source system.
    pub code: Option<String>,
    /// Signed VAT amount.
    pub amount: Decimal,
}

/// The mutation kinds the source system produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationKind {
    /// Starting balance contribution for the imported history.
    OpeningBalance {
        /// One row per account balance.
        rows: Vec<MutationRow>,
    },
    /// Invoice received from a supplier.
    PurchaseInvoice {
        /// Supplier relation code.
        relation: Option<RelationCode>,
        /// Invoice number.
        invoice_number: Option<String>,
        /// Expense rows.
        rows: Vec<MutationRow>,
        /// VAT lines.
        vat: Vec<VatLine>,
    },
    /// Invoice sent to a customer.
    SalesInvoice {
        /// Customer relation code.
        relation: Option<RelationCode>,
        /// Invoice number.
        invoice_number: Option<String>,
        /// Income rows.
        rows: Vec<MutationRow>,
        /// VAT lines.
        vat: Vec<VatLine>,
    },
    /// Payment received from a customer.
    CustomerPayment {
        /// Customer relation code.
        relation: Option<RelationCode>,
        /// Invoice number(s) this payment settles, comma-separated.
        invoice_number: Option<String>,
        /// Header amount.
        amount: Option<Decimal>,
        /// Row entries.
        rows: Vec<MutationRow>,
    },
    /// Payment sent to a supplier.
    SupplierPayment {
        /// Supplier relation code.
        relation: Option<RelationCode>,
        /// Invoice number(s) this payment settles, comma-separated.
        invoice_number: Option<String>,
        /// Header amount.
        amount: Option<Decimal>,
        /// Row entries.
        rows: Vec<MutationRow>,
    },
    /// Money received without an invoice.
    MoneyReceived {
        /// Header amount.
        amount: Option<Decimal>,
        /// Row entries.
        rows: Vec<MutationRow>,
    },
    /// Money spent without an invoice.
    MoneySpent {
        /// Header amount.
        amount: Option<Decimal>,
        /// Row entries.
        rows: Vec<MutationRow>,
    },
    /// Manual multi-line journal booking.
    Memorial {
        /// Destination rows; the main ledger is the source.
        rows: Vec<MutationRow>,
    },
}

impl MutationKind {
    /// Returns a stable label for reports and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpeningBalance { .. } => "opening_balance",
            Self::PurchaseInvoice { .. } => "purchase_invoice",
            Self::SalesInvoice { .. } => "sales_invoice",
            Self::CustomerPayment { .. } => "customer_payment",
            Self::SupplierPayment { .. } => "supplier_payment",
            Self::MoneyReceived { .. } => "money_received",
            Self::MoneySpent { .. } => "money_spent",
            Self::Memorial { .. } => "memorial",
        }
    }

    /// Returns the relation code, for kinds that carry one.
    #[must_use]
    pub const fn relation(&self) -> Option<&RelationCode> {
        match self {
            Self::PurchaseInvoice { relation, .. }
            | Self::SalesInvoice { relation, .. }
            | Self::CustomerPayment { relation, .. }
            | Self::SupplierPayment { relation, .. } => relation.as_ref(),
            Self::OpeningBalance { .. }
            | Self::MoneyReceived { .. }
            | Self::MoneySpent { .. }
            | Self::Memorial { .. } => None,
        }
    }
}

/// A typed external mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    /// External mutation number.
    pub id: MutationId,
    /// Posting date.
    pub date: NaiveDate,
    /// Header description.
    pub description: String,
    /// Main ledger code; its role depends on the kind (bank account for
    /// payments and money transfers, source account for memorials).
    pub main_ledger: Option<LedgerCode>,
    /// The mutation kind with its kind-specific fields.
    pub kind: MutationKind,
}

impl Mutation {
    /// Converts a raw wire record into the typed model.
    ///
    /// Amounts are normalized to the accounting precision. The main
    /// ledger keeps its source role distinct from the row (destination)
    /// ledgers.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::UnknownType`] for undocumented type codes.
    pub fn from_raw(raw: &RawMutation) -> Result<Self, MutationError> {
        let id = MutationId::from(raw.id);
        let rows: Vec<MutationRow> = raw
            .rows
            .iter()
            .map(|row| MutationRow {
                ledger: row.ledger_id.map(LedgerCode::from),
                amount: round_amount(row.amount),
                description: row.description.clone(),
            })
            .collect();
        let vat: Vec<VatLine> = raw
            .vat
            .iter()
            .map(|line| VatLine {
                code: line.code.clone(),
                amount: round_amount(line.amount),
            })
            .collect();
        let relation = raw.relation_id.clone().map(RelationCode::from);
        let invoice_number = raw.invoice_number.clone();
        let amount = raw.amount.map(round_amount);

        let kind = match raw.mutation_type {
            type_code::OPENING_BALANCE => MutationKind::OpeningBalance { rows },
            type_code::PURCHASE_INVOICE => MutationKind::PurchaseInvoice {
                relation,
                invoice_number,
                rows,
                vat,
            },
            type_code::SALES_INVOICE => MutationKind::SalesInvoice {
                relation,
                invoice_number,
                rows,
                vat,
            },
            type_code::CUSTOMER_PAYMENT => MutationKind::CustomerPayment {
                relation,
                invoice_number,
                amount,
                rows,
            },
            type_code::SUPPLIER_PAYMENT => MutationKind::SupplierPayment {
                relation,
                invoice_number,
                amount,
                rows,
            },
            type_code::MONEY_RECEIVED => MutationKind::MoneyReceived { amount, rows },
            type_code::MONEY_SPENT => MutationKind::MoneySpent { amount, rows },
            type_code::MEMORIAL => MutationKind::Memorial { rows },
            other => {
                return Err(MutationError::UnknownType {
                    mutation: id,
                    type_code: other,
                })
            }
        };

        Ok(Self {
            id,
            date: raw.date,
            description: raw
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| format!("e-Boekhouden import {id}")),
            main_ledger: raw.ledger_id.map(LedgerCode::from),
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::super::raw::RawRow;
    use super::*;

    fn raw(mutation_type: i32) -> RawMutation {
        RawMutation {
            id: 7296,
            mutation_type,
            date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            description: Some("Factuur".to_string()),
            ledger_id: Some(13_201_865),
            relation_id: Some("REL-0042".to_string()),
            invoice_number: Some("2024-0317".to_string()),
            amount: None,
            rows: vec![RawRow {
                ledger_id: Some(31_760_397),
                amount: dec!(113.08),
                description: None,
            }],
            vat: vec![],
        }
    }

    #[test]
    fn test_purchase_invoice_conversion() {
        let mutation = Mutation::from_raw(&raw(1)).unwrap();
        assert_eq!(mutation.id, MutationId::from(7296));
        assert_eq!(mutation.main_ledger, Some(LedgerCode(13_201_865)));
        match &mutation.kind {
            MutationKind::PurchaseInvoice {
                relation,
                invoice_number,
                rows,
                ..
            } => {
                assert_eq!(relation.as_ref().unwrap().as_str(), "REL-0042");
                assert_eq!(invoice_number.as_deref(), Some("2024-0317"));
                assert_eq!(rows[0].amount, dec!(113.08));
            }
            other => panic!("expected purchase invoice, got {other:?}"),
        }
    }

    #[test]
    fn test_all_documented_type_codes_convert() {
        for code in 0..=7 {
            let mutation = Mutation::from_raw(&raw(code)).unwrap();
            assert!(!mutation.kind.name().is_empty());
        }
    }

    #[test]
    fn test_unknown_type_code_is_an_error() {
        let err = Mutation::from_raw(&raw(10)).unwrap_err();
        assert_eq!(
            err,
            MutationError::UnknownType {
                mutation: MutationId::from(7296),
                type_code: 10,
            }
        );
    }

    #[test]
    fn test_amounts_normalized_to_cents() {
        let mut record = raw(7);
        record.rows[0].amount = dec!(10.005);
        let mutation = Mutation::from_raw(&record).unwrap();
        match &mutation.kind {
            MutationKind::Memorial { rows } => assert_eq!(rows[0].amount, dec!(10.00)),
            other => panic!("expected memorial, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_description_replaced() {
        let mut record = raw(2);
        record.description = Some("   ".to_string());
        let mutation = Mutation::from_raw(&record).unwrap();
        assert_eq!(mutation.description, "e-Boekhouden import 7296");
    }
}
