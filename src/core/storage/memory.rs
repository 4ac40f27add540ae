//! In-memory character store.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{CharacterPatch, CharacterStore, StoreError, StoreResult};
use crate::core::character_gen::assembler::CharacterRecord;

/// A saved record with its bookkeeping timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCharacter {
    pub id: String,
    pub record: CharacterRecord,
    pub created_at: String,
    pub updated_at: String,
}

/// Keeps saved characters in insertion order for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCharacterStore {
    records: IndexMap<String, StoredCharacter>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&StoredCharacter> {
        self.records.get(id)
    }

    pub fn list(&self) -> impl Iterator<Item = &StoredCharacter> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CharacterStore for InMemoryCharacterStore {
    fn save(&mut self, record: &CharacterRecord) -> StoreResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.records.insert(
            id.clone(),
            StoredCharacter {
                id: id.clone(),
                record: record.clone(),
                created_at: now.clone(),
                updated_at: now,
            },
        );
        tracing::debug!(character_id = %id, name = %record.name, "Saved character");
        Ok(id)
    }

    fn update(&mut self, id: &str, patch: &CharacterPatch) -> StoreResult<()> {
        let stored = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(format!("character:{id}")))?;
        patch.apply_to(&mut stored.record);
        stored.updated_at = chrono::Utc::now().to_rfc3339();
        Ok(())
    }
}
