//! Structured run warnings.
//!
//! Warnings record conditions that did not fail a mutation but need
//! operator attention, such as fallback mappings that were auto-created.

use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{AccountId, LedgerCode, MutationId, RelationCode};

/// A non-fatal condition recorded on the migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum RunWarning {
    /// A ledger code had no mapping; a placeholder mapping to a fallback
    /// account was created and flagged for review.
    UnmappedLedger {
        /// The unmapped external code.
        ledger: LedgerCode,
        /// The fallback account the placeholder points at.
        fallback_account: AccountId,
    },
    /// A relation code was unknown; a provisional party was created.
    ProvisionalParty {
        /// The unknown relation code.
        relation: RelationCode,
    },
    /// An opening balance row was dropped; its amount surfaces in the
    /// balancing line instead.
    SkippedOpeningRow {
        /// The row's ledger code, when present.
        ledger: Option<LedgerCode>,
        /// Why the row was dropped.
        reason: String,
    },
    /// An opening balance row mapped to a profit-and-loss account;
    /// opening entries are balance-sheet-only.
    ProfitAndLossOpeningAccount {
        /// The P&L account that was skipped.
        account: AccountId,
    },
    /// A money transfer carried more than one row; only the first row's
    /// counter account is used.
    ExtraRowsIgnored {
        /// The affected mutation.
        mutation: MutationId,
        /// Number of rows beyond the first.
        ignored: usize,
    },
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmappedLedger {
                ledger,
                fallback_account,
            } => write!(
                f,
                "no mapping for ledger {ledger}; placeholder created against account {fallback_account}"
            ),
            Self::ProvisionalParty { relation } => {
                write!(f, "unknown relation {relation}; provisional party created")
            }
            Self::SkippedOpeningRow { ledger, reason } => match ledger {
                Some(code) => write!(f, "opening row for ledger {code} skipped: {reason}"),
                None => write!(f, "opening row without ledger skipped: {reason}"),
            },
            Self::ProfitAndLossOpeningAccount { account } => {
                write!(f, "opening balance for P&L account {account} skipped")
            }
            Self::ExtraRowsIgnored { mutation, ignored } => {
                write!(f, "mutation {mutation}: {ignored} extra row(s) ignored")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = RunWarning::SkippedOpeningRow {
            ledger: Some(LedgerCode(42)),
            reason: "no mapping".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "opening row for ledger 42 skipped: no mapping"
        );
    }

    #[test]
    fn test_warning_serde_tag() {
        let warning = RunWarning::ProvisionalParty {
            relation: RelationCode::from("REL-1"),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["warning"], "provisional_party");
    }
}
