//! Ledger mapping store.
//!
//! The mapping table is shared mutable state: the resolver may auto-create
//! placeholder rows while a run is in flight. `insert_if_absent` is the
//! uniqueness seam — when two writers race on the same code, exactly one
//! row wins and both see it.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use boekstroom_core::mapping::LedgerMapping;
use boekstroom_shared::types::LedgerCode;

use super::blob::BlobStore;
use super::error::StoreError;

/// Operations on the ledger mapping table.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Reads the mapping for a ledger code.
    async fn get(&self, code: LedgerCode) -> Result<Option<LedgerMapping>, StoreError>;

    /// Inserts a mapping unless one already exists for the code; returns
    /// the winning row either way.
    async fn insert_if_absent(&self, mapping: LedgerMapping)
        -> Result<LedgerMapping, StoreError>;

    /// Replaces the mapping for a code (administrator correction).
    async fn upsert(&self, mapping: LedgerMapping) -> Result<(), StoreError>;
}

/// In-memory [`MappingStore`].
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    mappings: RwLock<HashMap<LedgerCode, LedgerMapping>>,
}

impl MemoryMappingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn get(&self, code: LedgerCode) -> Result<Option<LedgerMapping>, StoreError> {
        let mappings = self
            .mappings
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(mappings.get(&code).cloned())
    }

    async fn insert_if_absent(
        &self,
        mapping: LedgerMapping,
    ) -> Result<LedgerMapping, StoreError> {
        let mut mappings = self
            .mappings
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(mappings.entry(mapping.ledger).or_insert(mapping).clone())
    }

    async fn upsert(&self, mapping: LedgerMapping) -> Result<(), StoreError> {
        let mut mappings = self
            .mappings
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        mappings.insert(mapping.ledger, mapping);
        Ok(())
    }
}

/// Durable [`MappingStore`] storing one JSON object per ledger code.
#[derive(Debug, Clone)]
pub struct FileMappingStore {
    blobs: BlobStore,
}

impl FileMappingStore {
    /// Creates a store over the given blob store.
    #[must_use]
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    fn key(code: LedgerCode) -> String {
        format!("mappings/{code}.json")
    }
}

#[async_trait]
impl MappingStore for FileMappingStore {
    async fn get(&self, code: LedgerCode) -> Result<Option<LedgerMapping>, StoreError> {
        self.blobs.read_json(&Self::key(code)).await
    }

    async fn insert_if_absent(
        &self,
        mapping: LedgerMapping,
    ) -> Result<LedgerMapping, StoreError> {
        // The resolver serializes writers per code; this read-then-write
        // is atomic under that lock.
        if let Some(existing) = self.get(mapping.ledger).await? {
            return Ok(existing);
        }
        self.blobs
            .write_json(&Self::key(mapping.ledger), &mapping)
            .await?;
        Ok(mapping)
    }

    async fn upsert(&self, mapping: LedgerMapping) -> Result<(), StoreError> {
        self.blobs
            .write_json(&Self::key(mapping.ledger), &mapping)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use boekstroom_core::ledger::AccountType;
    use boekstroom_shared::types::AccountId;

    use super::*;

    fn mapping(code: i64, name: &str) -> LedgerMapping {
        LedgerMapping {
            ledger: LedgerCode(code),
            account: AccountId::new(),
            account_name: name.to_string(),
            account_type: AccountType::Expense,
            needs_review: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_insert_if_absent_keeps_first() {
        let store = MemoryMappingStore::new();
        let first = store.insert_if_absent(mapping(1, "first")).await.unwrap();
        let second = store.insert_if_absent(mapping(1, "second")).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(second.account_name, "first");
    }

    #[tokio::test]
    async fn test_memory_upsert_replaces() {
        let store = MemoryMappingStore::new();
        store.insert_if_absent(mapping(1, "first")).await.unwrap();
        let corrected = mapping(1, "corrected");
        store.upsert(corrected.clone()).await.unwrap();
        assert_eq!(store.get(LedgerCode(1)).await.unwrap(), Some(corrected));
    }

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let store = FileMappingStore::new(BlobStore::in_memory().unwrap());
        let row = mapping(31_760_397, "Kantoorkosten");
        store.insert_if_absent(row.clone()).await.unwrap();
        assert_eq!(
            store.get(LedgerCode(31_760_397)).await.unwrap(),
            Some(row.clone())
        );

        let other = store.insert_if_absent(mapping(31_760_397, "other")).await.unwrap();
        assert_eq!(other, row);
    }

    #[tokio::test]
    async fn test_file_store_missing_is_none() {
        let store = FileMappingStore::new(BlobStore::in_memory().unwrap());
        assert!(store.get(LedgerCode(404)).await.unwrap().is_none());
    }
}
