//! Batch orchestrator.
//!
//! Drives one migration run: fetch into the cache, a single synthetic
//! opening balance pass, then a strictly sequential loop over cached
//! mutations in ascending external-id order. Per-mutation errors are
//! caught at this boundary and recorded; only infrastructure failures
//! stop the run (`Paused` when resumable, `Failed` otherwise).
//! Cancellation is honored between mutations — an in-flight commit always
//! finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use boekstroom_core::classify::{classify, opening, ClassifiedDraft, OpeningEntry};
use boekstroom_core::ledger::ExternalRef;
use boekstroom_core::mapping::FallbackHint;
use boekstroom_core::mutation::{Mutation, MutationKind, RawMutation};
use boekstroom_core::report::{MigrationRun, MutationOutcome, RunEntry, RunWarning, Stage};
use boekstroom_store::{LedgerStore, MutationCache, RunStore, StoreError};

use super::client::MutationSource;
use super::committer::{CommitError, CommitOutcome, TransactionCommitter};
use super::dedup::DedupGuard;
use super::error::{EngineError, ResolveError};
use super::resolver::LedgerResolver;

/// Parameters of one migration run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Lower bound of the mutation date range (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Upper bound of the mutation date range (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Classify and validate without committing.
    pub dry_run: bool,
}

/// Cooperative cancellation flag, checked between mutations.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Requests cancellation; the run stops before the next mutation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true when cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A resumable infrastructure failure; pauses the run.
struct InfraFailure(String);

/// One logical worker processing one migration run at a time.
///
/// Concurrent runs must target disjoint mutation ranges; the mapping
/// table is the only shared mutable state and is protected per key by the
/// resolver.
pub struct BatchOrchestrator {
    source: Arc<dyn MutationSource>,
    cache: Arc<dyn MutationCache>,
    resolver: LedgerResolver,
    ledger: Arc<dyn LedgerStore>,
    dedup: DedupGuard,
    runs: Arc<dyn RunStore>,
    cancel: CancelHandle,
}

impl BatchOrchestrator {
    /// Wires an orchestrator over its collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn MutationSource>,
        cache: Arc<dyn MutationCache>,
        resolver: LedgerResolver,
        ledger: Arc<dyn LedgerStore>,
        runs: Arc<dyn RunStore>,
    ) -> Self {
        let dedup = DedupGuard::new(ledger.clone());
        Self {
            source,
            cache,
            resolver,
            ledger,
            dedup,
            runs,
            cancel: CancelHandle::default(),
        }
    }

    /// Returns a handle that cancels the current run between mutations.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Executes one migration run and returns its persisted report.
    ///
    /// Per-mutation failures never abort the run; the returned report is
    /// the single source of truth for what happened.
    ///
    /// # Errors
    ///
    /// Returns an error only when the run store itself fails — every
    /// other failure mode lands in the report.
    pub async fn run(&self, options: RunOptions) -> Result<MigrationRun, EngineError> {
        let mut run = MigrationRun::new(options.date_from, options.date_to, options.dry_run);
        self.runs.save(&run).await?;
        run.start();
        self.runs.save(&run).await?;
        info!(run = %run.id, dry_run = options.dry_run, "migration run started");

        // Fetch into the cache. The client retries transient failures
        // internally; a transient error here means retries are exhausted.
        match self
            .source
            .fetch_mutations(options.date_from, options.date_to)
            .await
        {
            Ok(raws) => {
                let fetched = raws.len() as u64;
                for raw in &raws {
                    if let Err(err) = self.cache.put(raw).await {
                        run.fail(format!("mutation cache write failed: {err}"));
                        self.runs.save(&run).await?;
                        return Ok(run);
                    }
                }
                run.record_fetched(fetched);
            }
            Err(err) if err.is_transient() => {
                run.pause(format!("source API unavailable: {err}"));
                self.runs.save(&run).await?;
                return Ok(run);
            }
            Err(err) => {
                run.fail(format!("fetch failed: {err}"));
                self.runs.save(&run).await?;
                return Ok(run);
            }
        }

        let raws = match self.cache.list_range(options.date_from, options.date_to).await {
            Ok(raws) => raws,
            Err(err) => {
                run.fail(format!("mutation cache read failed: {err}"));
                self.runs.save(&run).await?;
                return Ok(run);
            }
        };

        let committer = TransactionCommitter::new(self.ledger.clone(), options.dry_run);

        // Opening balances: one synthetic entry aggregating all type-0
        // mutations, committed before the ordinary loop.
        let opening_raws: Vec<&RawMutation> =
            raws.iter().filter(|raw| raw.mutation_type == 0).collect();
        if !opening_raws.is_empty() {
            match self.import_opening(&opening_raws, &committer, &mut run).await {
                Ok(entry) => {
                    run.record(entry);
                    self.runs.save(&run).await?;
                }
                Err(InfraFailure(reason)) => {
                    run.pause(reason);
                    self.runs.save(&run).await?;
                    return Ok(run);
                }
            }
        }

        for raw in raws.iter().filter(|raw| raw.mutation_type != 0) {
            if self.cancel.is_cancelled() {
                warn!(run = %run.id, "run cancelled by operator");
                run.cancel();
                self.runs.save(&run).await?;
                return Ok(run);
            }
            match self.process_mutation(raw, &committer, &mut run).await {
                Ok(entry) => {
                    run.record(entry);
                    self.runs.save(&run).await?;
                }
                Err(InfraFailure(reason)) => {
                    run.pause(reason);
                    self.runs.save(&run).await?;
                    return Ok(run);
                }
            }
        }

        run.complete();
        self.runs.save(&run).await?;
        info!(
            run = %run.id,
            imported = run.counts.imported,
            skipped = run.counts.skipped,
            failed = run.counts.failed,
            "migration run completed"
        );
        Ok(run)
    }

    /// Processes one ordinary mutation: convert, resolve, classify,
    /// dedup, commit. All per-mutation errors become a `Failed` outcome.
    async fn process_mutation(
        &self,
        raw: &RawMutation,
        committer: &TransactionCommitter,
        run: &mut MigrationRun,
    ) -> Result<RunEntry, InfraFailure> {
        let external_ref = ExternalRef::Mutation(raw.id.into());

        let mutation = match Mutation::from_raw(raw) {
            Ok(mutation) => mutation,
            Err(err) => {
                return Ok(failed(
                    external_ref,
                    "unknown",
                    Stage::Convert,
                    err.error_code(),
                    err.to_string(),
                ))
            }
        };
        let kind = mutation.kind.name();

        let (resolution, warnings) = match self.resolver.resolve_mutation(&mutation).await {
            Ok(resolved) => resolved,
            Err(ResolveError::Store(StoreError::Backend(reason))) => {
                return Err(InfraFailure(reason))
            }
            Err(err) => {
                return Ok(failed(
                    external_ref,
                    kind,
                    Stage::Resolve,
                    err.error_code(),
                    err.to_string(),
                ))
            }
        };
        for warning in warnings {
            run.warn(warning);
        }

        let classified = match classify(&mutation, &resolution) {
            Ok(classified) => classified,
            Err(err) => {
                return Ok(failed(
                    external_ref,
                    kind,
                    Stage::Classify,
                    err.error_code(),
                    err.to_string(),
                ))
            }
        };

        self.finish(classified, external_ref, kind, committer, run)
            .await
    }

    /// Aggregates and commits the opening balance entry.
    async fn import_opening(
        &self,
        raws: &[&RawMutation],
        committer: &TransactionCommitter,
        run: &mut MigrationRun,
    ) -> Result<RunEntry, InfraFailure> {
        let kind = "opening_balance";
        let mut entries: Vec<OpeningEntry> = Vec::new();
        let mut date: Option<NaiveDate> = None;

        for raw in raws {
            let Ok(mutation) = Mutation::from_raw(raw) else {
                continue;
            };
            date = Some(date.map_or(mutation.date, |d| d.min(mutation.date)));
            let MutationKind::OpeningBalance { rows } = &mutation.kind else {
                continue;
            };
            for row in rows {
                let Some(code) = row.ledger else {
                    run.warn(RunWarning::SkippedOpeningRow {
                        ledger: None,
                        reason: "row without ledger code".to_string(),
                    });
                    continue;
                };
                match self.resolver.resolve_ledger(code, FallbackHint::Strict).await {
                    Ok((account, _)) => entries.push(OpeningEntry {
                        ledger: Some(code),
                        account,
                        balance: row.amount,
                    }),
                    Err(ResolveError::Store(StoreError::Backend(reason))) => {
                        return Err(InfraFailure(reason))
                    }
                    Err(err) => run.warn(RunWarning::SkippedOpeningRow {
                        ledger: Some(code),
                        reason: err.to_string(),
                    }),
                }
            }
        }

        let date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());
        let classified = match opening::build_opening_balance(
            date,
            &entries,
            self.resolver.fallbacks().balancing,
        ) {
            Ok(classified) => classified,
            Err(err) => {
                return Ok(failed(
                    ExternalRef::OpeningBalance,
                    kind,
                    Stage::Classify,
                    err.error_code(),
                    err.to_string(),
                ))
            }
        };

        self.finish(classified, ExternalRef::OpeningBalance, kind, committer, run)
            .await
    }

    /// Shared tail of both pipelines: record warnings, dedup immediately
    /// before commit, commit.
    async fn finish(
        &self,
        classified: ClassifiedDraft,
        external_ref: ExternalRef,
        kind: &str,
        committer: &TransactionCommitter,
        run: &mut MigrationRun,
    ) -> Result<RunEntry, InfraFailure> {
        for warning in classified.warnings {
            run.warn(warning);
        }

        match self.dedup.already_imported(&external_ref).await {
            Ok(Some(existing)) => {
                return Ok(RunEntry {
                    external_ref,
                    kind: kind.to_string(),
                    outcome: MutationOutcome::Skipped { existing },
                })
            }
            Ok(None) => {}
            Err(StoreError::Backend(reason)) => return Err(InfraFailure(reason)),
            Err(err) => {
                return Ok(failed(
                    external_ref,
                    kind,
                    Stage::Dedup,
                    "STORE_ERROR",
                    err.to_string(),
                ))
            }
        }

        let outcome = match committer.commit(&classified.draft).await {
            Ok(CommitOutcome::Committed(transaction)) => MutationOutcome::Imported { transaction },
            Ok(CommitOutcome::DryRun) => MutationOutcome::DryRun,
            Err(CommitError::Validation(err)) => {
                return Ok(failed(
                    external_ref,
                    kind,
                    Stage::Validate,
                    err.error_code(),
                    err.to_string(),
                ))
            }
            Err(CommitError::Store(StoreError::Conflict(_))) => {
                // Lost a commit race to a concurrent run; resolve to skip.
                match self.dedup.already_imported(&external_ref).await {
                    Ok(Some(existing)) => MutationOutcome::Skipped { existing },
                    _ => {
                        return Ok(failed(
                            external_ref,
                            kind,
                            Stage::Commit,
                            "CONFLICT",
                            "concurrent import detected".to_string(),
                        ))
                    }
                }
            }
            Err(CommitError::Store(StoreError::Backend(reason))) => {
                return Err(InfraFailure(reason))
            }
            Err(CommitError::Store(err)) => {
                return Ok(failed(
                    external_ref,
                    kind,
                    Stage::Commit,
                    "STORE_ERROR",
                    err.to_string(),
                ))
            }
        };

        Ok(RunEntry {
            external_ref,
            kind: kind.to_string(),
            outcome,
        })
    }
}

fn failed(
    external_ref: ExternalRef,
    kind: &str,
    stage: Stage,
    code: &str,
    message: String,
) -> RunEntry {
    RunEntry {
        external_ref,
        kind: kind.to_string(),
        outcome: MutationOutcome::Failed {
            stage,
            code: code.to_string(),
            message,
        },
    }
}
