//! Ledger mapping and party resolver.
//!
//! Translates external ledger codes and relation codes into internal
//! accounts and parties before classification. Missing mappings fall back
//! to the configured account for the code's position and leave a
//! placeholder mapping flagged for review; a mutation is never silently
//! dropped. Placeholder creation is serialized per ledger code so
//! concurrent mutations cannot create duplicate mapping rows.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::debug;

use boekstroom_core::classify::{
    ledger_requirements, party_requirement, FallbackAccounts, Resolution, ResolvedAccount,
};
use boekstroom_core::mapping::{FallbackHint, LedgerMapping};
use boekstroom_core::mutation::Mutation;
use boekstroom_core::report::RunWarning;
use boekstroom_shared::types::{LedgerCode, RelationCode};
use boekstroom_store::{LedgerStore, MappingStore, PartyStore};

use super::error::ResolveError;

/// Relation code used when a mutation needs a party but names none.
const GENERIC_RELATION: &str = "GENERIC";

/// Cached resolver over the mapping table and the collaborator stores.
pub struct LedgerResolver {
    mappings: Arc<dyn MappingStore>,
    ledger: Arc<dyn LedgerStore>,
    parties: Arc<dyn PartyStore>,
    fallbacks: FallbackAccounts,
    locks: DashMap<LedgerCode, Arc<Mutex<()>>>,
    cache: Cache<LedgerCode, ResolvedAccount>,
}

impl LedgerResolver {
    /// Creates a resolver over the given stores and fallback accounts.
    #[must_use]
    pub fn new(
        mappings: Arc<dyn MappingStore>,
        ledger: Arc<dyn LedgerStore>,
        parties: Arc<dyn PartyStore>,
        fallbacks: FallbackAccounts,
    ) -> Self {
        Self {
            mappings,
            ledger,
            parties,
            fallbacks,
            locks: DashMap::new(),
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(std::time::Duration::from_secs(300))
                .build(),
        }
    }

    /// The configured fallback accounts.
    #[must_use]
    pub const fn fallbacks(&self) -> &FallbackAccounts {
        &self.fallbacks
    }

    /// Resolves one ledger code.
    ///
    /// Returns the account plus a warning when a placeholder mapping had
    /// to be created.
    pub async fn resolve_ledger(
        &self,
        code: LedgerCode,
        hint: FallbackHint,
    ) -> Result<(ResolvedAccount, Option<RunWarning>), ResolveError> {
        if let Some(resolved) = self.cache.get(&code).await {
            return Ok((resolved, None));
        }

        if let Some(mapping) = self.mappings.get(code).await? {
            let resolved = self.verify_mapping(&mapping).await?;
            self.cache.insert(code, resolved).await;
            return Ok((resolved, None));
        }

        if hint == FallbackHint::Strict {
            return Err(ResolveError::UnmappedStrict(code));
        }

        // Serialize placeholder creation per code.
        let lock = self
            .locks
            .entry(code)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        if let Some(mapping) = self.mappings.get(code).await? {
            let resolved = self.verify_mapping(&mapping).await?;
            self.cache.insert(code, resolved).await;
            return Ok((resolved, None));
        }

        let fallback = self.fallback_for(hint);
        let placeholder = LedgerMapping {
            ledger: code,
            account: fallback.account,
            account_name: format!("Unmapped ledger {code}"),
            account_type: fallback.account_type,
            needs_review: true,
            created_at: Utc::now(),
        };
        let winning = self.mappings.insert_if_absent(placeholder).await?;
        debug!(%code, account = %winning.account, "created placeholder mapping");

        let resolved = ResolvedAccount {
            account: winning.account,
            account_type: winning.account_type,
        };
        self.cache.insert(code, resolved).await;
        Ok((
            resolved,
            Some(RunWarning::UnmappedLedger {
                ledger: code,
                fallback_account: winning.account,
            }),
        ))
    }

    /// Resolves everything one mutation references: its ledger codes and,
    /// when the kind requires one, its party.
    pub async fn resolve_mutation(
        &self,
        mutation: &Mutation,
    ) -> Result<(Resolution, Vec<RunWarning>), ResolveError> {
        let mut resolution = Resolution::new(self.fallbacks);
        let mut warnings = Vec::new();

        for requirement in ledger_requirements(mutation) {
            let (resolved, warning) = self
                .resolve_ledger(requirement.code, requirement.hint)
                .await?;
            resolution.insert(requirement.code, resolved);
            if let Some(warning) = warning {
                warnings.push(warning);
            }
        }

        if let Some(role) = party_requirement(&mutation.kind) {
            let code = mutation
                .kind
                .relation()
                .cloned()
                .unwrap_or_else(|| RelationCode::from(GENERIC_RELATION));
            match self.parties.find(&code, role).await? {
                Some(party) => resolution.set_party(party.id),
                None => {
                    let party = self.parties.create_provisional(&code, role).await?;
                    warnings.push(RunWarning::ProvisionalParty {
                        relation: code.clone(),
                    });
                    resolution.set_party(party.id);
                }
            }
        }

        Ok((resolution, warnings))
    }

    /// Confirms a mapping's account still exists; the ledger store's
    /// classification wins over the mapping's cached one.
    async fn verify_mapping(&self, mapping: &LedgerMapping) -> Result<ResolvedAccount, ResolveError> {
        let info = self
            .ledger
            .account_info(mapping.account)
            .await?
            .ok_or(ResolveError::BrokenMapping {
                ledger: mapping.ledger,
                account: mapping.account,
            })?;
        Ok(ResolvedAccount {
            account: info.id,
            account_type: info.account_type,
        })
    }

    fn fallback_for(&self, hint: FallbackHint) -> ResolvedAccount {
        match hint {
            FallbackHint::Bank => self.fallbacks.bank,
            FallbackHint::Income => self.fallbacks.income,
            FallbackHint::Expense => self.fallbacks.expense,
            FallbackHint::Suspense | FallbackHint::Strict => self.fallbacks.suspense,
        }
    }
}
