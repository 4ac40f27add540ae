//! Storage module.
//!
//! Persistence collaborators for the character builder:
//! - [`CharacterStore`]: receives finished character records (`save`) and
//!   partial updates to them (`update`)
//! - [`DraftStore`]: keeps in-progress wizard snapshots between sessions
//!
//! Both are traits so frontends can plug in their own backends. The crate
//! ships an in-memory character store and a JSON-file draft store.
//!
//! # Modules
//!
//! - `error` - Error types for storage operations
//! - `memory` - In-memory [`CharacterStore`]
//! - `drafts` - [`DraftStore`] and its JSON-file implementation

pub mod error;
pub mod memory;
pub mod drafts;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryCharacterStore, StoredCharacter};
pub use drafts::{DraftStore, JsonFileDraftStore};

use serde::{Deserialize, Serialize};

use crate::core::character_gen::assembler::CharacterRecord;
use crate::core::character_gen::inventory::BagLedger;

/// Destination for finished characters.
#[cfg_attr(test, mockall::automock)]
pub trait CharacterStore {
    /// Persist a new record and return its id.
    fn save(&mut self, record: &CharacterRecord) -> StoreResult<String>;

    /// Apply a partial update to a saved record.
    fn update(&mut self, id: &str, patch: &CharacterPatch) -> StoreResult<()>;
}

/// Partial update to a saved character. `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub money: Option<f64>,
    pub inventory: Option<BagLedger>,
}

impl CharacterPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.notes.is_none() && self.money.is_none() && self.inventory.is_none()
    }

    pub fn apply_to(&self, record: &mut CharacterRecord) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(notes) = &self.notes {
            record.notes = Some(notes.clone());
        }
        if let Some(money) = self.money {
            record.money = money;
        }
        if let Some(inventory) = &self.inventory {
            record.replace_inventory(inventory.clone());
        }
    }
}
