//! Character Assembler
//!
//! Turns a fully confirmed [`WizardSelection`] into the [`CharacterRecord`]
//! handed to the character store. Pure: the catalog and rules are read, never
//! written, and the record carries no timestamps or ids.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::attributes::{Attribute, AttributeScore};
use super::catalog::{Catalog, ClassDefinition};
use super::inventory::{BagLedger, EquipmentRef};
use super::skills::{self, OriginBenefit, TrainedSkill};
use super::wizard::machine::{is_step_confirmed, skill_context};
use super::wizard::{ClassConfiguration, WizardError, WizardSelection, WizardStep};
use crate::config::RulesConfig;

/// Name given to a character the player never named.
pub const DEFAULT_NAME: &str = "Unnamed";

/// Base defense before dexterity and armor.
const BASE_DEFENSE: i32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub hit_points: i32,
    pub mana_points: i32,
    pub defense: i32,
    /// Space taken by everything carried
    pub spaces: f64,
    pub carry_capacity: i32,
    /// Informational only; never blocks anything
    pub overloaded: bool,
    pub armor_penalty: i32,
}

/// A finished character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    pub race: String,
    pub class: String,
    pub class_configuration: ClassConfiguration,
    pub origin: String,
    pub deity: String,
    pub attributes: BTreeMap<Attribute, AttributeScore>,
    pub skills: Vec<TrainedSkill>,
    pub powers: Vec<String>,
    /// Origin benefits that trained nothing new
    #[serde(default)]
    pub origin_advisories: Vec<String>,
    pub inventory: BagLedger,
    pub money: f64,
    pub derived: DerivedStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CharacterRecord {
    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name.as_str()).collect()
    }

    /// Swap the inventory and recompute the stats that depend on it.
    pub fn replace_inventory(&mut self, inventory: BagLedger) {
        let dexterity = self
            .attributes
            .get(&Attribute::Dexterity)
            .map(|s| s.total)
            .unwrap_or(0);
        self.derived.defense = BASE_DEFENSE
            .saturating_add(i32::from(dexterity))
            .saturating_add(inventory.defense_bonus());
        self.derived.spaces = inventory.spaces();
        self.derived.armor_penalty = inventory.armor_penalty();
        self.derived.overloaded = self.derived.spaces > f64::from(self.derived.carry_capacity);
        self.inventory = inventory;
    }
}

/// Look up a selected name. An unset name is `None`; a name the catalog
/// lacks is an error.
fn known<'a, T>(
    kind: &'static str,
    name: Option<&str>,
    lookup: impl FnOnce(&str) -> Option<&'a T>,
) -> Result<Option<&'a T>, WizardError> {
    match name {
        None => Ok(None),
        Some(name) => lookup(name).map(Some).ok_or_else(|| WizardError::UnknownReference {
            kind,
            name: name.to_string(),
        }),
    }
}

/// Build the final record. Fails if the selection refers to something the
/// catalog no longer has, or if any step is unconfirmed.
pub fn assemble(
    selection: &WizardSelection,
    catalog: &Catalog,
    rules: &RulesConfig,
) -> Result<CharacterRecord, WizardError> {
    let race = known("race", selection.race.as_deref(), |n| catalog.race(n))?;
    let class = known("class", selection.class.as_deref(), |n| catalog.class(n))?;
    let origin = known("origin", selection.origin.as_deref(), |n| catalog.origin(n))?;
    let deity = known("deity", selection.deity.as_deref(), |n| catalog.deity(n))?;

    if let Some(step) = WizardStep::CONFIRMABLE
        .iter()
        .copied()
        .find(|&s| !is_step_confirmed(selection, s, catalog))
    {
        return Err(WizardError::Incomplete(step));
    }
    let race = race.ok_or(WizardError::Incomplete(WizardStep::RaceSelect))?;
    let class = class.ok_or(WizardError::Incomplete(WizardStep::ClassSelect))?;
    let origin = origin.ok_or(WizardError::Incomplete(WizardStep::OriginSelect))?;
    let deity = deity.ok_or(WizardError::Incomplete(WizardStep::DeitySelect))?;

    let ctx = skill_context(catalog, selection, class);
    let resolution = skills::resolve(&ctx, &selection.skills);
    let trained = skills::final_skills(&resolution, &selection.origin_benefits);
    let advisories = skills::origin_advisories(&resolution, &selection.origin_benefits)
        .iter()
        .map(ToString::to_string)
        .collect();

    let attributes = selection.attributes.scores(&race.modifiers);
    let inventory = starting_inventory(selection, catalog, class, &origin.items, rules);

    let mut powers: Vec<String> = Vec::new();
    let candidates = race
        .powers
        .iter()
        .chain(selection.origin_benefits.iter().filter_map(|b| match b {
            OriginBenefit::Power(name) => Some(name),
            OriginBenefit::Skill(_) => None,
        }))
        .chain(selection.granted_power.iter());
    for power in candidates {
        if !powers.iter().any(|p| p.eq_ignore_ascii_case(power)) {
            powers.push(power.clone());
        }
    }

    let total = |attribute: Attribute| {
        attributes
            .get(&attribute)
            .map(|s| i32::from(s.total))
            .unwrap_or(0)
    };
    let carry_capacity = rules
        .carry_base
        .saturating_add(rules.carry_per_strength.saturating_mul(total(Attribute::Strength)))
        .max(0);

    let mut record = CharacterRecord {
        name: selection
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        race: race.name.clone(),
        class: class.name.clone(),
        class_configuration: selection.class_configuration.clone(),
        origin: origin.name.clone(),
        deity: deity.name.clone(),
        skills: trained,
        powers,
        origin_advisories: advisories,
        inventory: BagLedger::new(),
        money: selection.money_remaining(),
        derived: DerivedStats {
            hit_points: class
                .initial_hit_points
                .saturating_add(total(Attribute::Constitution))
                .max(1),
            mana_points: class.mana_per_level,
            defense: BASE_DEFENSE,
            spaces: 0.0,
            carry_capacity,
            overloaded: false,
            armor_penalty: 0,
        },
        attributes,
        notes: None,
    };
    record.replace_inventory(inventory);

    tracing::info!(
        name = %record.name,
        race = %record.race,
        class = %record.class,
        skills = record.skills.len(),
        items = record.inventory.len(),
        "Assembled character"
    );
    Ok(record)
}

/// Class kit, origin items and purchases in one bag.
fn starting_inventory(
    selection: &WizardSelection,
    catalog: &Catalog,
    class: &ClassDefinition,
    origin_items: &[EquipmentRef],
    rules: &RulesConfig,
) -> BagLedger {
    let resolved: Vec<_> = class
        .starting_items
        .iter()
        .chain(origin_items)
        .map(|item| catalog.resolve_equipment(item, rules.placeholder_space))
        .collect();
    BagLedger::new()
        .add_items(&resolved)
        .merge(&selection.purchases)
}
