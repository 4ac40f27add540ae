//! Wizard composition root.
//!
//! [`CharacterWizard`] owns the catalog, the rules, the current
//! [`WizardState`] and the character store. Frontends talk to it and nothing
//! else; every state change still goes through [`machine::apply`].

use serde_json::Value;

use super::machine::{self, RulesContext};
use super::snapshot;
use super::types::{WizardAction, WizardError, WizardState, WizardSummary};
use super::view::WizardView;
use crate::config::RulesConfig;
use crate::core::character_gen::assembler::{self, CharacterRecord};
use crate::core::character_gen::catalog::Catalog;
use crate::core::storage::{CharacterPatch, CharacterStore, DraftStore};

pub struct CharacterWizard<S> {
    catalog: Catalog,
    rules: RulesConfig,
    store: S,
    state: WizardState,
}

impl<S: CharacterStore> CharacterWizard<S> {
    /// Start a fresh build on the first step.
    pub fn new(catalog: Catalog, rules: RulesConfig, store: S) -> Self {
        let state = WizardState::new(&rules);
        Self::with_state(catalog, rules, store, state)
    }

    /// Continue from a previously stored state.
    pub fn with_state(catalog: Catalog, rules: RulesConfig, store: S, state: WizardState) -> Self {
        Self {
            catalog,
            rules,
            store,
            state,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn dispatch(&mut self, action: &WizardAction) -> &WizardState {
        let ctx = RulesContext::new(&self.catalog, &self.rules);
        self.state = machine::apply(&self.state, action, &ctx);
        &self.state
    }

    /// Apply actions in order.
    pub fn dispatch_all<'a>(&mut self, actions: impl IntoIterator<Item = &'a WizardAction>) -> &WizardState {
        for action in actions {
            self.dispatch(action);
        }
        &self.state
    }

    /// Roll a fresh attribute pool with a random seed.
    pub fn roll_attributes(&mut self) -> &WizardState {
        let seed = rand::random::<u64>();
        self.dispatch(&WizardAction::RollAttributes { seed })
    }

    pub fn view(&self) -> WizardView {
        WizardView::build(&self.state, &self.catalog)
    }

    pub fn summary(&self) -> WizardSummary {
        machine::summarize(&self.state, &self.catalog)
    }

    pub fn snapshot(&self) -> serde_json::Result<Value> {
        snapshot::encode(&self.state)
    }

    pub fn save_draft(&self, drafts: &impl DraftStore) -> Result<(), WizardError> {
        drafts.save_draft(&self.state)?;
        Ok(())
    }

    /// The record `finalize` would save, without saving it.
    pub fn preview(&self) -> Result<CharacterRecord, WizardError> {
        assembler::assemble(&self.state.selection, &self.catalog, &self.rules)
    }

    /// Assemble and save the character, then reset to the hub with a new build.
    /// On failure the wizard is left untouched.
    pub fn finalize(&mut self) -> Result<String, WizardError> {
        let record = self.preview()?;
        let id = self.store.save(&record)?;
        tracing::info!(
            wizard_id = %self.state.id,
            character_id = %id,
            name = %record.name,
            "Finalized character"
        );

        let mut fresh = WizardState::new(&self.rules);
        fresh.in_hub = true;
        self.state = fresh;
        Ok(id)
    }

    /// Forward a partial update of a saved character to the store.
    pub fn update_saved(&mut self, id: &str, patch: &CharacterPatch) -> Result<(), WizardError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.store.update(id, patch)?;
        tracing::debug!(character_id = %id, "Updated saved character");
        Ok(())
    }
}
