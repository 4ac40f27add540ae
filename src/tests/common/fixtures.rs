//! Test Fixtures
//!
//! Builds wizard states by replaying action scripts against the built-in
//! catalog. The reference build is a Human Warrior named Brakka:
//!
//! - Strength 2 (+1 any slot), Intelligence 1, any slots on Constitution and Dexterity
//! - Warrior picking Fighting, Athletics, Perception and one general skill (Healing)
//! - Two ropes and a healing potion bought (27 spent)
//! - Soldier origin with Fighting (already trained) and Weapon Drill
//! - Aldren granting Total Courage

use crate::config::RulesConfig;
use crate::core::character_gen::attributes::Attribute;
use crate::core::character_gen::catalog::Catalog;
use crate::core::character_gen::skills::OriginBenefit;
use crate::core::character_gen::wizard::machine::{apply, RulesContext};
use crate::core::character_gen::wizard::{WizardAction, WizardState};

pub fn test_rules() -> RulesConfig {
    RulesConfig::default()
}

pub fn test_catalog() -> Catalog {
    Catalog::builtin()
}

/// Replay `actions` on top of `state`.
pub fn replay(state: &WizardState, actions: &[WizardAction], catalog: &Catalog, rules: &RulesConfig) -> WizardState {
    let ctx = RulesContext::new(catalog, rules);
    actions.iter().fold(state.clone(), |s, a| apply(&s, a, &ctx))
}

/// Replay `actions` on a fresh wizard.
pub fn build(actions: &[WizardAction]) -> WizardState {
    let rules = test_rules();
    replay(&WizardState::new(&rules), actions, &test_catalog(), &rules)
}

pub fn race_actions(race: &str) -> Vec<WizardAction> {
    vec![
        WizardAction::SelectRace { race: race.into() },
        WizardAction::Confirm,
    ]
}

/// Point-buy for the reference Human: spent 3, remaining 7.
pub fn human_attribute_actions() -> Vec<WizardAction> {
    use Attribute::*;
    vec![
        WizardAction::IncrementAttribute { attribute: Strength },
        WizardAction::IncrementAttribute { attribute: Strength },
        WizardAction::IncrementAttribute { attribute: Intelligence },
        WizardAction::AssignAnySlot { slot: 0, attribute: Some(Strength) },
        WizardAction::AssignAnySlot { slot: 1, attribute: Some(Constitution) },
        WizardAction::AssignAnySlot { slot: 2, attribute: Some(Dexterity) },
        WizardAction::Confirm,
    ]
}

/// Warrior picks for an intelligence total of 1.
pub fn warrior_actions() -> Vec<WizardAction> {
    vec![
        WizardAction::SelectClass { class: "Warrior".into() },
        WizardAction::ChooseBasicSkill { group: 0, skill: "Fighting".into() },
        WizardAction::ToggleClassSkill { skill: "Athletics".into() },
        WizardAction::ToggleClassSkill { skill: "Perception".into() },
        WizardAction::ToggleGeneralSkill { skill: "Healing".into() },
        WizardAction::PurchaseItem { item: "Rope".into(), quantity: 2 },
        WizardAction::PurchaseItem { item: "Healing Potion".into(), quantity: 1 },
        WizardAction::Confirm,
    ]
}

pub fn soldier_actions() -> Vec<WizardAction> {
    vec![
        WizardAction::SelectOrigin { origin: "Soldier".into() },
        WizardAction::ToggleOriginBenefit { benefit: OriginBenefit::Skill("Fighting".into()) },
        WizardAction::ToggleOriginBenefit { benefit: OriginBenefit::Power("Weapon Drill".into()) },
        WizardAction::Confirm,
    ]
}

pub fn aldren_actions() -> Vec<WizardAction> {
    vec![
        WizardAction::SelectDeity { deity: "Aldren".into() },
        WizardAction::ChooseGrantedPower { power: "Total Courage".into() },
        WizardAction::Confirm,
    ]
}

/// Every action of the reference build, ending on the summary step.
pub fn reference_build_actions() -> Vec<WizardAction> {
    let mut actions = vec![WizardAction::SetName { name: "Brakka".into() }];
    actions.extend(race_actions("Human"));
    actions.extend(human_attribute_actions());
    actions.extend(warrior_actions());
    actions.extend(soldier_actions());
    actions.extend(aldren_actions());
    actions
}

pub fn reference_build() -> WizardState {
    build(&reference_build_actions())
}
