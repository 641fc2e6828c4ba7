//! Classification errors.

use thiserror::Error;

use boekstroom_shared::types::{LedgerCode, MutationId};

/// Errors raised while building a transaction draft from a mutation.
///
/// Every variant is a per-mutation failure: the batch loop records it and
/// continues with the next mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A referenced ledger code is absent from the resolution context.
    #[error("Mutation {mutation}: ledger {ledger} was not resolved")]
    UnresolvedLedger {
        /// The affected mutation.
        mutation: MutationId,
        /// The missing code.
        ledger: LedgerCode,
    },

    /// A memorial booking has no main ledger.
    #[error("Mutation {mutation}: memorial booking without a main ledger")]
    MissingMainLedger {
        /// The affected mutation.
        mutation: MutationId,
    },

    /// The mutation kind requires a party but none resolved.
    #[error("Mutation {mutation}: no party resolved for relation")]
    MissingParty {
        /// The affected mutation.
        mutation: MutationId,
    },

    /// The mutation nets to zero and would produce an empty transaction.
    #[error("Mutation {mutation}: zero amount, nothing to post")]
    ZeroAmount {
        /// The affected mutation.
        mutation: MutationId,
    },

    /// VAT lines are present but no VAT account is configured.
    #[error("Mutation {mutation}: VAT lines present but no VAT account configured")]
    VatAccountNotConfigured {
        /// The affected mutation.
        mutation: MutationId,
    },

    /// Opening balance mutations are aggregated into one synthetic entry
    /// per run and never classified individually.
    #[error("Mutation {mutation}: opening balances are aggregated per run")]
    OpeningBalanceMutation {
        /// The affected mutation.
        mutation: MutationId,
    },

    /// The aggregated opening balance pass produced no postable lines.
    #[error("Opening balance import produced no postable lines")]
    EmptyOpeningBalance,
}

impl ClassifyError {
    /// Returns the error code for reports and structured logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnresolvedLedger { .. } => "UNRESOLVED_LEDGER",
            Self::MissingMainLedger { .. } => "MISSING_MAIN_LEDGER",
            Self::MissingParty { .. } => "MISSING_PARTY",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::VatAccountNotConfigured { .. } => "VAT_ACCOUNT_NOT_CONFIGURED",
            Self::OpeningBalanceMutation { .. } => "OPENING_BALANCE_MUTATION",
            Self::EmptyOpeningBalance => "EMPTY_OPENING_BALANCE",
        }
    }
}
