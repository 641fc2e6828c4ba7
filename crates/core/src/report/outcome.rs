//! Per-mutation outcome records.

use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{MutationId, TransactionId};

use crate::ledger::ExternalRef;

/// Pipeline stage at which a mutation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Converting the raw record into the typed model.
    Convert,
    /// Resolving ledger and relation codes.
    Resolve,
    /// Building the transaction draft.
    Classify,
    /// Checking for an existing import.
    Dedup,
    /// Validating the draft invariants.
    Validate,
    /// Persisting the transaction.
    Commit,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Convert => "convert",
            Self::Resolve => "resolve",
            Self::Classify => "classify",
            Self::Dedup => "dedup",
            Self::Validate => "validate",
            Self::Commit => "commit",
        };
        write!(f, "{name}")
    }
}

/// What happened to one mutation during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MutationOutcome {
    /// A transaction was committed.
    Imported {
        /// The committed transaction.
        transaction: TransactionId,
    },
    /// Dry run: the draft validated but nothing was persisted.
    DryRun,
    /// Skipped — a transaction with this external reference already exists.
    Skipped {
        /// The previously committed transaction.
        existing: TransactionId,
    },
    /// The mutation failed at a pipeline stage; the run continued.
    Failed {
        /// Stage at which processing stopped.
        stage: Stage,
        /// Stable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

impl MutationOutcome {
    /// Returns true for the failure variant.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One line of the run's outcome log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    /// The processed external record.
    pub external_ref: ExternalRef,
    /// Stable kind label (`purchase_invoice`, `memorial`, ...).
    pub kind: String,
    /// What happened.
    pub outcome: MutationOutcome,
}

impl RunEntry {
    /// Returns the mutation id for ordinary mutations, `None` for the
    /// synthetic opening balance entry.
    #[must_use]
    pub const fn mutation_id(&self) -> Option<MutationId> {
        match self.external_ref {
            ExternalRef::Mutation(id) => Some(id),
            ExternalRef::OpeningBalance => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = MutationOutcome::Failed {
            stage: Stage::Validate,
            code: "UNBALANCED_TRANSACTION".to_string(),
            message: "Debit: 1, Credit: 2".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "failed");
        assert_eq!(json["stage"], "validate");
    }

    #[test]
    fn test_entry_mutation_id() {
        let entry = RunEntry {
            external_ref: ExternalRef::Mutation(MutationId::from(7296)),
            kind: "purchase_invoice".to_string(),
            outcome: MutationOutcome::DryRun,
        };
        assert_eq!(entry.mutation_id(), Some(MutationId::from(7296)));

        let entry = RunEntry {
            external_ref: ExternalRef::OpeningBalance,
            kind: "opening_balance".to_string(),
            outcome: MutationOutcome::DryRun,
        };
        assert_eq!(entry.mutation_id(), None);
    }
}
