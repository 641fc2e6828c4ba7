//! Migration run persistence.
//!
//! Run reports are saved incrementally while a run progresses, so a crash
//! still leaves a readable report on disk.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use boekstroom_core::report::MigrationRun;
use boekstroom_shared::types::MigrationRunId;

use super::blob::BlobStore;
use super::error::StoreError;

/// Persistence for migration run reports.
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Saves (or replaces) a run report.
    async fn save(&self, run: &MigrationRun) -> Result<(), StoreError>;

    /// Loads a run report.
    async fn load(&self, id: MigrationRunId) -> Result<Option<MigrationRun>, StoreError>;
}

/// In-memory [`RunStore`].
#[derive(Debug, Default)]
pub struct MemoryRunStore {
    runs: RwLock<HashMap<MigrationRunId, MigrationRun>>,
}

impl MemoryRunStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RunStore for MemoryRunStore {
    async fn save(&self, run: &MigrationRun) -> Result<(), StoreError> {
        self.runs
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?
            .insert(run.id, run.clone());
        Ok(())
    }

    async fn load(&self, id: MigrationRunId) -> Result<Option<MigrationRun>, StoreError> {
        Ok(self
            .runs
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?
            .get(&id)
            .cloned())
    }
}

/// Durable [`RunStore`] storing one JSON object per run.
#[derive(Debug, Clone)]
pub struct FileRunStore {
    blobs: BlobStore,
}

impl FileRunStore {
    /// Creates a store over the given blob store.
    #[must_use]
    pub fn new(blobs: BlobStore) -> Self {
        Self { blobs }
    }

    fn key(id: MigrationRunId) -> String {
        format!("runs/{id}.json")
    }
}

#[async_trait]
impl RunStore for FileRunStore {
    async fn save(&self, run: &MigrationRun) -> Result<(), StoreError> {
        self.blobs.write_json(&Self::key(run.id), run).await
    }

    async fn load(&self, id: MigrationRunId) -> Result<Option<MigrationRun>, StoreError> {
        self.blobs.read_json(&Self::key(id)).await
    }
}
