//! Draft store
//!
//! Persists in-progress wizard states so a build can be resumed in a later
//! session. Snapshots go through [`snapshot`](crate::core::character_gen::wizard::snapshot),
//! so a damaged file loads as much as it can instead of failing.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{StoreError, StoreResult};
use crate::config::RulesConfig;
use crate::core::character_gen::wizard::{snapshot, WizardState};

pub trait DraftStore {
    fn save_draft(&self, state: &WizardState) -> StoreResult<()>;
    fn load_draft(&self, id: &str) -> StoreResult<Option<WizardState>>;
    /// Every stored draft, most recently updated first.
    fn list_drafts(&self) -> StoreResult<Vec<WizardState>>;
    fn delete_draft(&self, id: &str) -> StoreResult<()>;
}

/// One pretty-printed JSON file per wizard id.
#[derive(Debug, Clone)]
pub struct JsonFileDraftStore {
    dir: PathBuf,
    rules: RulesConfig,
}

impl JsonFileDraftStore {
    pub fn new(dir: impl Into<PathBuf>, rules: RulesConfig) -> Self {
        Self {
            dir: dir.into(),
            rules,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> StoreResult<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::write(format!("invalid draft id: {id:?}")));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

impl DraftStore for JsonFileDraftStore {
    fn save_draft(&self, state: &WizardState) -> StoreResult<()> {
        let path = self.path_for(&state.id)?;
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&snapshot::encode(state)?)?;
        fs::write(&path, json)?;
        tracing::debug!(wizard_id = %state.id, path = %path.display(), "Saved wizard draft");
        Ok(())
    }

    fn load_draft(&self, id: &str) -> StoreResult<Option<WizardState>> {
        let path = self.path_for(id)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(snapshot::restore(&contents, &self.rules))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_drafts(&self) -> StoreResult<Vec<WizardState>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut drafts = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(contents) => drafts.push(snapshot::restore(&contents, &self.rules)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable draft");
                }
            }
        }
        drafts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(drafts)
    }

    fn delete_draft(&self, id: &str) -> StoreResult<()> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
