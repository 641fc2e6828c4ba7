//! Party store seam.
//!
//! Parties (customers and suppliers) live in the target system. Unknown
//! relation codes get a provisional party so the import never stalls on
//! missing master data; provisional parties are enriched later from the
//! source system's relation details.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use boekstroom_core::classify::PartyRole;
use boekstroom_shared::types::{PartyId, RelationCode};

use super::error::StoreError;

/// A business partner record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    /// Internal party id.
    pub id: PartyId,
    /// External relation code.
    pub code: RelationCode,
    /// Role this record plays.
    pub role: PartyRole,
    /// Display name.
    pub name: String,
    /// True until the party is enriched with real relation details.
    pub provisional: bool,
}

/// Operations the engine needs from the target party registry.
#[async_trait]
pub trait PartyStore: Send + Sync {
    /// Finds a party by relation code and role.
    async fn find(
        &self,
        code: &RelationCode,
        role: PartyRole,
    ) -> Result<Option<Party>, StoreError>;

    /// Creates a provisional party for an unknown relation code. Returns
    /// the existing record when one appeared concurrently.
    async fn create_provisional(
        &self,
        code: &RelationCode,
        role: PartyRole,
    ) -> Result<Party, StoreError>;
}

/// In-memory reference implementation of [`PartyStore`].
#[derive(Debug, Default)]
pub struct MemoryPartyStore {
    parties: RwLock<HashMap<(RelationCode, PartyRole), Party>>,
}

impl MemoryPartyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a known (non-provisional) party.
    ///
    /// # Panics
    ///
    /// Panics when the internal lock is poisoned.
    pub fn seed_party(&self, code: &RelationCode, role: PartyRole, name: &str) -> Party {
        let party = Party {
            id: PartyId::new(),
            code: code.clone(),
            role,
            name: name.to_string(),
            provisional: false,
        };
        self.parties
            .write()
            .expect("party state lock")
            .insert((code.clone(), role), party.clone());
        party
    }
}

#[async_trait]
impl PartyStore for MemoryPartyStore {
    async fn find(
        &self,
        code: &RelationCode,
        role: PartyRole,
    ) -> Result<Option<Party>, StoreError> {
        let parties = self
            .parties
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        Ok(parties.get(&(code.clone(), role)).cloned())
    }

    async fn create_provisional(
        &self,
        code: &RelationCode,
        role: PartyRole,
    ) -> Result<Party, StoreError> {
        let mut parties = self
            .parties
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".to_string()))?;
        let entry = parties
            .entry((code.clone(), role))
            .or_insert_with(|| Party {
                id: PartyId::new(),
                code: code.clone(),
                role,
                name: format!("Provisional {code}"),
                provisional: true,
            });
        Ok(entry.clone())
    }
}
