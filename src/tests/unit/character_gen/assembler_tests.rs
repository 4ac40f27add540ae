//! Assembler tests
//!
//! Check the finished record built from the reference Human Warrior.

use crate::core::character_gen::assembler::{assemble, CharacterRecord, DEFAULT_NAME};
use crate::core::character_gen::attributes::Attribute;
use crate::core::character_gen::inventory::EquipmentGroup;
use crate::core::character_gen::skills::{SkillSource, TrainedSkill};
use crate::core::character_gen::wizard::{WizardAction, WizardError, WizardStep};
use crate::tests::common::*;

fn reference_record() -> CharacterRecord {
    assemble(&reference_build().selection, &test_catalog(), &test_rules())
        .expect("reference build assembles")
}

fn trained(name: &str, source: SkillSource) -> TrainedSkill {
    TrainedSkill {
        name: name.to_string(),
        source,
    }
}

#[test]
fn test_identity_fields() {
    let record = reference_record();
    assert_eq!(record.name, "Brakka");
    assert_eq!(record.race, "Human");
    assert_eq!(record.class, "Warrior");
    assert_eq!(record.origin, "Soldier");
    assert_eq!(record.deity, "Aldren");
    assert!(record.class_configuration.is_empty());
    assert_eq!(record.notes, None);
}

#[test]
fn test_attribute_totals() {
    let record = reference_record();
    let total = |a: Attribute| record.attributes[&a].total;
    assert_eq!(total(Attribute::Strength), 3);
    assert_eq!(record.attributes[&Attribute::Strength].base, 2);
    assert_eq!(record.attributes[&Attribute::Strength].racial_bonus, 1);
    assert_eq!(total(Attribute::Constitution), 1);
    assert_eq!(total(Attribute::Dexterity), 1);
    assert_eq!(total(Attribute::Intelligence), 1);
    assert_eq!(total(Attribute::Wisdom), 0);
    assert_eq!(total(Attribute::Charisma), 0);
}

#[test]
fn test_skills_keep_first_source() {
    let record = reference_record();
    assert_eq!(
        record.skills,
        vec![
            trained("Fighting", SkillSource::Basic),
            trained("Fortitude", SkillSource::Basic),
            trained("Athletics", SkillSource::Class),
            trained("Perception", SkillSource::Class),
            trained("Healing", SkillSource::General),
        ]
    );
    assert_eq!(record.origin_advisories.len(), 1);
    assert!(record.origin_advisories[0].contains("class basic skills"));
}

#[test]
fn test_powers_from_race_origin_and_deity() {
    let record = reference_record();
    assert_eq!(record.powers, vec!["Versatile", "Weapon Drill", "Total Courage"]);
}

#[test]
fn test_inventory_merges_kit_origin_and_purchases() {
    let record = reference_record();
    let bag = &record.inventory;
    assert_eq!(bag.quantity_of(EquipmentGroup::Weapon, "Longsword"), 1);
    assert_eq!(bag.quantity_of(EquipmentGroup::Weapon, "Shortsword"), 1);
    assert_eq!(bag.quantity_of(EquipmentGroup::Armor, "Chainmail"), 1);
    assert_eq!(bag.quantity_of(EquipmentGroup::GeneralItem, "Rope"), 2);
    assert_eq!(bag.quantity_of(EquipmentGroup::Alchemical, "Healing Potion"), 1);

    // Not in the catalog, so a free placeholder
    let uniform = bag
        .group(EquipmentGroup::GeneralItem)
        .iter()
        .find(|e| e.name == "Uniform")
        .expect("origin item present");
    assert_eq!(uniform.price, 0.0);
    assert_eq!(uniform.space, 0.5);
}

#[test]
fn test_derived_stats() {
    let record = reference_record();
    let derived = &record.derived;
    assert_eq!(derived.hit_points, 21);
    assert_eq!(derived.mana_points, 3);
    assert_eq!(derived.spaces, 14.0);
    assert_eq!(derived.armor_penalty, 4);
    assert_eq!(derived.defense, 19);
    assert_eq!(derived.carry_capacity, 16);
    assert!(!derived.overloaded);
    assert_eq!(record.money, 73.0);
}

#[test]
fn test_unnamed_character_gets_default_name() {
    let mut actions = reference_build_actions();
    actions.remove(0);
    let state = build(&actions);

    let record = assemble(&state.selection, &test_catalog(), &test_rules()).unwrap();
    assert_eq!(record.name, DEFAULT_NAME);
}

#[test]
fn test_partial_build_reports_first_missing_step() {
    let mut actions = race_actions("Human");
    actions.extend(human_attribute_actions());
    actions.extend(warrior_actions());
    let state = build(&actions);

    let err = assemble(&state.selection, &test_catalog(), &test_rules()).unwrap_err();
    assert!(matches!(err, WizardError::Incomplete(WizardStep::OriginSelect)));
}

#[test]
fn test_invalidated_choice_blocks_assembly() {
    let state = replay(
        &reference_build(),
        &[
            WizardAction::GoTo { step: WizardStep::AttributeAssign },
            WizardAction::IncrementAttribute { attribute: Attribute::Intelligence },
            WizardAction::Confirm,
        ],
        &test_catalog(),
        &test_rules(),
    );

    let err = assemble(&state.selection, &test_catalog(), &test_rules()).unwrap_err();
    assert!(matches!(err, WizardError::Incomplete(WizardStep::ClassSelect)));
}

#[test]
fn test_heavy_load_is_only_flagged() {
    let mut record = reference_record();
    let anvil = crate::core::character_gen::inventory::EquipmentEntry::new(
        "Anvil",
        EquipmentGroup::GeneralItem,
        10.0,
        0.0,
    );
    let heavier = record.inventory.add_items(&[anvil]);
    record.replace_inventory(heavier);

    assert_eq!(record.derived.spaces, 24.0);
    assert!(record.derived.overloaded);
    assert_eq!(record.derived.defense, 19);
}
