//! Migration run record and state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use boekstroom_shared::types::{MigrationRunId, MutationId};

use super::outcome::{MutationOutcome, RunEntry};
use super::warning::RunWarning;

/// Migration run status.
///
/// `Pending -> Running -> (Completed | Failed)`. `Paused` is the
/// resumable terminal of exhausted transient retries; `Cancelled` the
/// terminal of an operator cancellation between mutations. Per-mutation
/// failures never make a run `Failed` — that status is reserved for
/// infrastructure errors where no mutation can proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, not yet started.
    Pending,
    /// Processing mutations.
    Running,
    /// Transient infrastructure failure persisted after retries; the run
    /// can be resumed.
    Paused,
    /// The loop finished, possibly with recorded per-mutation failures.
    Completed,
    /// A non-recoverable infrastructure error aborted the run.
    Failed,
    /// The operator cancelled the run between mutations.
    Cancelled,
}

impl RunStatus {
    /// Returns true when the run has stopped processing.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

/// Aggregate counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    /// Mutations fetched into the cache.
    pub fetched: u64,
    /// Transactions committed.
    pub imported: u64,
    /// Mutations skipped as duplicates.
    pub skipped: u64,
    /// Mutations that failed a pipeline stage.
    pub failed: u64,
    /// Drafts validated in dry-run mode.
    pub dry_run: u64,
}

/// A migration run and its persisted report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRun {
    /// Run identifier.
    pub id: MigrationRunId,
    /// Current status.
    pub status: RunStatus,
    /// Lower bound of the imported date range.
    pub date_from: Option<NaiveDate>,
    /// Upper bound of the imported date range.
    pub date_to: Option<NaiveDate>,
    /// Whether this run commits transactions.
    pub dry_run: bool,
    /// When the run was created.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
    /// Aggregate counts.
    pub counts: RunCounts,
    /// Per-mutation outcome log.
    pub entries: Vec<RunEntry>,
    /// Structured warnings.
    pub warnings: Vec<RunWarning>,
    /// Why the run stopped, for `Paused`/`Failed`/`Cancelled`.
    pub stop_reason: Option<String>,
}

impl MigrationRun {
    /// Creates a pending run for the given date range.
    #[must_use]
    pub fn new(date_from: Option<NaiveDate>, date_to: Option<NaiveDate>, dry_run: bool) -> Self {
        Self {
            id: MigrationRunId::new(),
            status: RunStatus::Pending,
            date_from,
            date_to,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            counts: RunCounts::default(),
            entries: Vec::new(),
            warnings: Vec::new(),
            stop_reason: None,
        }
    }

    /// Transitions the run to `Running`.
    pub fn start(&mut self) {
        self.status = RunStatus::Running;
    }

    /// Records how many mutations the fetch step cached.
    pub fn record_fetched(&mut self, count: u64) {
        self.counts.fetched += count;
    }

    /// Appends an outcome entry and updates the counts.
    pub fn record(&mut self, entry: RunEntry) {
        match &entry.outcome {
            MutationOutcome::Imported { .. } => self.counts.imported += 1,
            MutationOutcome::DryRun => self.counts.dry_run += 1,
            MutationOutcome::Skipped { .. } => self.counts.skipped += 1,
            MutationOutcome::Failed { .. } => self.counts.failed += 1,
        }
        self.entries.push(entry);
    }

    /// Appends a warning.
    pub fn warn(&mut self, warning: RunWarning) {
        self.warnings.push(warning);
    }

    /// Marks the run `Completed`.
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
        self.finished_at = Some(Utc::now());
    }

    /// Marks the run `Failed` with the aborting error.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.stop_reason = Some(reason.into());
        self.finished_at = Some(Utc::now());
    }

    /// Marks the run `Paused` after exhausted transient retries.
    pub fn pause(&mut self, reason: impl Into<String>) {
        self.status = RunStatus::Paused;
        self.stop_reason = Some(reason.into());
        self.finished_at = Some(Utc::now());
    }

    /// Marks the run `Cancelled`.
    pub fn cancel(&mut self) {
        self.status = RunStatus::Cancelled;
        self.stop_reason = Some("cancelled by operator".to_string());
        self.finished_at = Some(Utc::now());
    }

    /// Returns the mutation ids of all failed entries, for a targeted
    /// re-run.
    #[must_use]
    pub fn failed_mutations(&self) -> Vec<MutationId> {
        self.entries
            .iter()
            .filter(|entry| entry.outcome.is_failure())
            .filter_map(RunEntry::mutation_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use boekstroom_shared::types::TransactionId;

    use crate::ledger::ExternalRef;
    use crate::report::outcome::Stage;

    use super::*;

    fn entry(id: i64, outcome: MutationOutcome) -> RunEntry {
        RunEntry {
            external_ref: ExternalRef::Mutation(MutationId::from(id)),
            kind: "memorial".to_string(),
            outcome,
        }
    }

    #[test]
    fn test_counts_follow_outcomes() {
        let mut run = MigrationRun::new(None, None, false);
        run.start();
        run.record(entry(
            1,
            MutationOutcome::Imported {
                transaction: TransactionId::new(),
            },
        ));
        run.record(entry(
            2,
            MutationOutcome::Skipped {
                existing: TransactionId::new(),
            },
        ));
        run.record(entry(
            3,
            MutationOutcome::Failed {
                stage: Stage::Resolve,
                code: "MAPPING_ERROR".to_string(),
                message: "no mapping".to_string(),
            },
        ));
        assert_eq!(run.counts.imported, 1);
        assert_eq!(run.counts.skipped, 1);
        assert_eq!(run.counts.failed, 1);
    }

    #[test]
    fn test_failed_mutations_lists_only_failures() {
        let mut run = MigrationRun::new(None, None, false);
        run.record(entry(
            7,
            MutationOutcome::Failed {
                stage: Stage::Classify,
                code: "X".to_string(),
                message: String::new(),
            },
        ));
        run.record(entry(8, MutationOutcome::DryRun));
        assert_eq!(run.failed_mutations(), vec![MutationId::from(7)]);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Paused.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_report_roundtrips_through_json() {
        let mut run = MigrationRun::new(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 12, 31),
            true,
        );
        run.start();
        run.record(entry(1, MutationOutcome::DryRun));
        run.complete();
        let json = serde_json::to_string(&run).unwrap();
        let back: MigrationRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
    }
}
