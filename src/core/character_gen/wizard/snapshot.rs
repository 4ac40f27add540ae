//! Snapshot persistence boundary
//!
//! A persisted wizard is plain JSON. [`encode`] writes it; [`restore`] reads it
//! back field by field so that a damaged or partially shaped snapshot still
//! loads, with every unreadable field falling back to its default. Bags go
//! through [`BagLedger::from_plain_data`] here and nowhere else.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::types::{
    ClassDraft, DeityDraft, OriginDraft, WizardDraft, WizardSelection, WizardState, WizardStep,
};
use crate::config::RulesConfig;
use crate::core::character_gen::inventory::BagLedger;

pub fn encode(state: &WizardState) -> serde_json::Result<Value> {
    serde_json::to_value(state)
}

/// Rebuild a wizard from snapshot text. Never fails; the restored wizard
/// opens on the hub so the player chooses to resume or discard.
pub fn restore(raw: &str, rules: &RulesConfig) -> WizardState {
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Wizard snapshot is not valid JSON, starting fresh");
            Value::Null
        }
    };
    restore_value(&value, rules)
}

pub fn restore_value(value: &Value, rules: &RulesConfig) -> WizardState {
    let mut state = WizardState::new(rules);
    state.in_hub = true;

    let Some(root) = section(Some(value), "snapshot") else {
        return state;
    };

    if let Some(id) = root.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
        state.id = id.to_string();
    } else {
        tracing::warn!(wizard_id = %state.id, "Snapshot has no id, assigned a new one");
    }

    if let Some(step) = root.get("current_step").and_then(Value::as_str) {
        match WizardStep::try_from(step) {
            Ok(step) => state.current_step = step,
            Err(e) => tracing::warn!(error = %e, "Using first step"),
        }
    }

    if let Some(created_at) = root.get("created_at").and_then(Value::as_str) {
        state.created_at = created_at.to_string();
    }
    if let Some(updated_at) = root.get("updated_at").and_then(Value::as_str) {
        state.updated_at = updated_at.to_string();
    }

    state.selection = restore_selection(root.get("selection"), rules);
    state.draft = restore_draft(root.get("draft"));
    state
}

fn section<'a>(value: Option<&'a Value>, name: &str) -> Option<&'a Map<String, Value>> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            tracing::warn!(section = name, "Snapshot section is not an object, using defaults");
            None
        }
    }
}

/// Read one field, logging and returning `None` when it does not fit.
fn field<T: DeserializeOwned>(map: &Map<String, Value>, key: &str, section: &str) -> Option<T> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value(raw.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(section, field = key, error = %e, "Dropping malformed snapshot field");
                None
            }
        },
    }
}

fn restore_selection(value: Option<&Value>, rules: &RulesConfig) -> WizardSelection {
    let mut selection = WizardSelection::new(rules.starting_money);
    let Some(map) = section(value, "selection") else {
        return selection;
    };
    const S: &str = "selection";

    selection.name = field(map, "name", S);
    selection.race = field(map, "race", S);
    selection.attributes = field(map, "attributes", S).unwrap_or_default();
    selection.attributes_confirmed = field(map, "attributes_confirmed", S).unwrap_or(false);
    selection.class = field(map, "class", S);
    selection.class_configuration = field(map, "class_configuration", S).unwrap_or_default();
    selection.skills = field(map, "skills", S).unwrap_or_default();
    selection.origin = field(map, "origin", S);
    selection.origin_benefits = field(map, "origin_benefits", S).unwrap_or_default();
    selection.deity = field(map, "deity", S);
    selection.granted_power = field(map, "granted_power", S);
    selection.purchases = restore_bag(map.get("purchases"));
    selection.budget = match field::<f64>(map, "budget", S) {
        Some(budget) if budget.is_finite() && budget >= 0.0 => budget,
        Some(budget) => {
            tracing::warn!(budget, "Snapshot budget out of range, using starting money");
            rules.starting_money
        }
        None => rules.starting_money,
    };
    selection
}

fn restore_bag(value: Option<&Value>) -> BagLedger {
    value.map(BagLedger::from_plain_data).unwrap_or_default()
}

fn restore_draft(value: Option<&Value>) -> WizardDraft {
    let mut draft = WizardDraft::default();
    let Some(map) = section(value, "draft") else {
        return draft;
    };
    const D: &str = "draft";

    draft.race = field(map, "race", D);
    draft.attributes = field(map, "attributes", D);

    draft.class = section(map.get("class"), "draft.class").and_then(|class| {
        let name: String = field(class, "class", "draft.class")?;
        Some(ClassDraft {
            class: name,
            configuration: field(class, "configuration", "draft.class").unwrap_or_default(),
            skills: field(class, "skills", "draft.class").unwrap_or_default(),
            purchases: restore_bag(class.get("purchases")),
        })
    });

    draft.origin = section(map.get("origin"), "draft.origin").and_then(|origin| {
        Some(OriginDraft {
            origin: field(origin, "origin", "draft.origin")?,
            benefits: field(origin, "benefits", "draft.origin").unwrap_or_default(),
        })
    });

    draft.deity = section(map.get("deity"), "draft.deity").and_then(|deity| {
        Some(DeityDraft {
            deity: field(deity, "deity", "draft.deity")?,
            power: field(deity, "power", "draft.deity"),
        })
    });

    draft
}
