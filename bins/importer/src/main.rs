//! Boekstroom migration runner.
//!
//! Loads configuration, wires the durable engine state (mutation cache,
//! mapping table, run reports) onto the configured data directory, runs
//! one migration against the e-Boekhouden API, and prints the persisted
//! report. The ledger store here is the in-memory reference seeded from a
//! chart-of-accounts file; production deployments implement `LedgerStore`
//! against their accounting system instead.

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boekstroom_core::ledger::AccountType;
use boekstroom_core::report::{MutationOutcome, RunStatus};
use boekstroom_engine::{
    resolve_fallback_accounts, BatchOrchestrator, EBoekhoudenClient, LedgerResolver, RunOptions,
};
use boekstroom_shared::AppConfig;
use boekstroom_store::{
    BlobStore, FileMappingStore, FileMutationCache, FileRunStore, MemoryLedgerStore,
    MemoryPartyStore,
};

/// One row of the chart-of-accounts seed file.
#[derive(Debug, Deserialize)]
struct ChartAccount {
    code: String,
    name: String,
    #[serde(rename = "type")]
    account_type: AccountType,
    #[serde(default)]
    is_group: bool,
}

fn load_chart(ledger: &MemoryLedgerStore, path: &str) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read chart file {path}"))?;
    let accounts: Vec<ChartAccount> =
        serde_json::from_str(&raw).with_context(|| format!("cannot parse chart file {path}"))?;
    for account in &accounts {
        ledger.seed_account(
            &account.code,
            &account.name,
            account.account_type,
            account.is_group,
        );
    }
    Ok(accounts.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "boekstroom=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load and validate configuration before touching anything.
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    // Durable engine state under the data directory.
    let blobs = BlobStore::local_fs(&config.storage.data_dir)
        .context("failed to open data directory")?;
    let cache = Arc::new(FileMutationCache::new(blobs.clone()));
    let mappings = Arc::new(FileMappingStore::new(blobs.clone()));
    let runs = Arc::new(FileRunStore::new(blobs));

    // Reference ledger and party stores.
    let ledger = Arc::new(MemoryLedgerStore::new());
    match &config.import.chart_file {
        Some(path) => {
            let count = load_chart(&ledger, path)?;
            info!(count, path, "seeded chart of accounts");
        }
        None => warn!("no chart file configured; only auto-created accounts will exist"),
    }
    let parties = Arc::new(MemoryPartyStore::new());

    // Fail fast when the configured accounts cannot be resolved.
    let fallbacks = resolve_fallback_accounts(ledger.as_ref(), &config.import.accounts)
        .await
        .context("fallback account bootstrap failed")?;

    let client = EBoekhoudenClient::new(&config.source).context("failed to build API client")?;
    let resolver = LedgerResolver::new(mappings, ledger.clone(), parties, fallbacks);
    let orchestrator = BatchOrchestrator::new(
        Arc::new(client),
        cache,
        resolver,
        ledger,
        runs,
    );

    let run = orchestrator
        .run(RunOptions {
            date_from: config.import.date_from,
            date_to: config.import.date_to,
            dry_run: config.import.dry_run,
        })
        .await
        .context("migration run failed")?;

    println!("run {} finished: {:?}", run.id, run.status);
    println!(
        "  fetched {}, imported {}, skipped {}, failed {}, dry-run {}",
        run.counts.fetched,
        run.counts.imported,
        run.counts.skipped,
        run.counts.failed,
        run.counts.dry_run
    );
    if let Some(reason) = &run.stop_reason {
        println!("  stopped: {reason}");
    }
    for warning in &run.warnings {
        println!("  warning: {warning}");
    }
    for entry in &run.entries {
        if let MutationOutcome::Failed {
            stage,
            code,
            message,
        } = &entry.outcome
        {
            println!(
                "  failed {} ({}) at {stage}: {code} {message}",
                entry.external_ref, entry.kind
            );
        }
    }

    if run.status != RunStatus::Completed {
        std::process::exit(1);
    }
    Ok(())
}
