//! Mutation cache.
//!
//! Raw mutation records are cached durably after fetching so a run can be
//! replayed or resumed without touching the external API again. Writes
//! are idempotent per external id (last write wins); records are expected
//! content-stable. A storage error fails the current fetch step only —
//! records cached earlier stay valid.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;

use boekstroom_core::mutation::RawMutation;
use boekstroom_shared::types::MutationId;

use super::blob::BlobStore;
use super::error::StoreError;

/// Durable store of raw mutation records, keyed by external id.
#[async_trait]
pub trait MutationCache: Send + Sync {
    /// Stores a raw record, replacing any previous version.
    async fn put(&self, mutation: &RawMutation) -> Result<(), StoreError>;

    /// Reads one record.
    async fn get(&self, id: MutationId) -> Result<Option<RawMutation>, StoreError>;

    /// Lists records in the inclusive date range, ascending by external
    /// id. `None` bounds are open.
    async fn list_range(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<RawMutation>, StoreError>;

    /// Number of cached records.
    async fn len(&self) -> Result<usize, StoreError>;

    /// Returns true when nothing is cached.
    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}

fn in_range(
    mutation: &RawMutation,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
) -> bool {
    date_from.map_or(true, |from| mutation.date >= from)
        && date_to.map_or(true, |to| mutation.date <= to)
}

/// In-memory [`MutationCache`], ordered by external id.
#[derive(Debug, Default)]
pub struct MemoryMutationCache {
    records: RwLock<BTreeMap<i64, RawMutation>>,
}

impl MemoryMutationCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MutationCache for MemoryMutationCache {
    async fn put(&self, mutation: &RawMutation) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?
            .insert(mutation.id, mutation.clone());
        Ok(())
    }

    async fn get(&self, id: MutationId) -> Result<Option<RawMutation>, StoreError> {
        Ok(self
            .records
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?
            .get(&id.into_inner())
            .cloned())
    }

    async fn list_range(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<RawMutation>, StoreError> {
        Ok(self
            .records
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?
            .values()
            .filter(|mutation| in_range(mutation, date_from, date_to))
            .cloned()
            .collect())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self
            .records
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?
            .len())
    }
}

/// Durable [`MutationCache`] storing one JSON object per mutation.
#[derive(Debug, Clone)]
pub struct FileMutationCache {
    blobs: BlobStore,
}

impl FileMutationCache {
    /// Creates a cache over the given blob store.
    #[must_use]
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    fn key(id: i64) -> String {
        format!("mutations/{id}.json")
    }
}

#[async_trait]
impl MutationCache for FileMutationCache {
    async fn put(&self, mutation: &RawMutation) -> Result<(), StoreError> {
        self.blobs.write_json(&Self::key(mutation.id), mutation).await
    }

    async fn get(&self, id: MutationId) -> Result<Option<RawMutation>, StoreError> {
        self.blobs.read_json(&Self::key(id.into_inner())).await
    }

    async fn list_range(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<RawMutation>, StoreError> {
        let mut mutations = Vec::new();
        for key in self.blobs.list_keys("mutations/").await? {
            if let Some(mutation) = self.blobs.read_json::<RawMutation>(&key).await? {
                if in_range(&mutation, date_from, date_to) {
                    mutations.push(mutation);
                }
            }
        }
        mutations.sort_by_key(|mutation| mutation.id);
        Ok(mutations)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.blobs.list_keys("mutations/").await?.len())
    }
}
