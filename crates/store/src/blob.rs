//! JSON blob persistence on Apache OpenDAL.
//!
//! Durable engine state (cached mutations, ledger mappings, run reports)
//! is stored as one JSON object per key. The filesystem service backs
//! production use; the memory service backs tests.

use opendal::{services, Operator};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::StoreError;

/// A JSON object store over an OpenDAL operator.
#[derive(Debug, Clone)]
pub struct BlobStore {
    operator: Operator,
}

impl BlobStore {
    /// Creates a filesystem-backed store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot be initialized.
    pub fn local_fs(root: &str) -> Result<Self, StoreError> {
        let builder = services::Fs::default().root(root);
        let operator = Operator::new(builder)?.finish();
        Ok(Self { operator })
    }

    /// Creates an in-memory store, for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the operator cannot be initialized.
    pub fn in_memory() -> Result<Self, StoreError> {
        let builder = services::Memory::default();
        let operator = Operator::new(builder)?.finish();
        Ok(Self { operator })
    }

    /// Writes a value as JSON under `key`, replacing any previous value.
    pub async fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.operator.write(key, bytes).await?;
        Ok(())
    }

    /// Reads and deserializes the value under `key`, or `None` when absent.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.operator.read(key).await {
            Ok(buffer) => Ok(Some(serde_json::from_slice(&buffer.to_vec())?)),
            Err(err) if err.kind() == opendal::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the keys under a prefix (non-recursive).
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.operator.list(prefix).await?;
        Ok(entries
            .into_iter()
            .filter(|entry| !entry.path().ends_with('/'))
            .map(|entry| entry.path().to_string())
            .collect())
    }
}
