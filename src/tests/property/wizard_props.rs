//! Property-based tests for the wizard state machine
//!
//! Random action sequences against the built-in catalog must keep:
//! - the current step enterable whenever the hub is closed
//! - purchases within budget, in the selection and in the class draft
//! - at most two origin benefits
//! - point-buy spending within budget
//! - the wizard id across every action

use proptest::prelude::*;

use crate::core::character_gen::attributes::Attribute;
use crate::core::character_gen::inventory::EquipmentGroup;
use crate::core::character_gen::skills::{OriginBenefit, ORIGIN_BENEFIT_COUNT};
use crate::core::character_gen::wizard::machine::{apply, can_enter, RulesContext};
use crate::core::character_gen::wizard::{WizardAction, WizardState, WizardStep};
use crate::tests::common::*;

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn name_from(names: &[&'static str]) -> impl Strategy<Value = String> {
    prop::sample::select(names.to_vec()).prop_map(str::to_string)
}

fn arb_skill() -> impl Strategy<Value = String> {
    name_from(&[
        "Fighting", "Aim", "Athletics", "Perception", "Healing", "Knowledge", "Diplomacy",
        "Stealth", "Will", "Religion", "War", "Survival",
    ])
}

fn arb_attribute() -> impl Strategy<Value = Attribute> {
    prop::sample::select(Attribute::ALL.to_vec())
}

fn arb_action() -> impl Strategy<Value = WizardAction> {
    prop_oneof![
        4 => Just(WizardAction::Confirm),
        2 => Just(WizardAction::Back),
        1 => Just(WizardAction::OpenHub),
        1 => Just(WizardAction::Resume),
        1 => Just(WizardAction::Discard),
        1 => prop::sample::select(WizardStep::ALL.to_vec()).prop_map(|step| WizardAction::GoTo { step }),
        2 => name_from(&["Human", "Dwarf", "Elf", "Half-Giant"]).prop_map(|race| WizardAction::SelectRace { race }),
        3 => arb_attribute().prop_map(|attribute| WizardAction::IncrementAttribute { attribute }),
        1 => arb_attribute().prop_map(|attribute| WizardAction::DecrementAttribute { attribute }),
        2 => (0usize..3, prop::option::of(arb_attribute()))
            .prop_map(|(slot, attribute)| WizardAction::AssignAnySlot { slot, attribute }),
        2 => name_from(&["Warrior", "Arcanist", "Rogue"]).prop_map(|class| WizardAction::SelectClass { class }),
        1 => arb_skill().prop_map(|skill| WizardAction::ChooseBasicSkill { group: 0, skill }),
        3 => arb_skill().prop_map(|skill| WizardAction::ToggleClassSkill { skill }),
        2 => arb_skill().prop_map(|skill| WizardAction::ToggleGeneralSkill { skill }),
        2 => (name_from(&["Rope", "Healing Potion", "Longsword", "Riding Horse", "Chainmail"]), 0u32..4)
            .prop_map(|(item, quantity)| WizardAction::PurchaseItem { item, quantity }),
        1 => name_from(&["Rope", "Longsword"]).prop_map(|item| WizardAction::ReturnItem {
            group: if item == "Rope" { EquipmentGroup::GeneralItem } else { EquipmentGroup::Weapon },
            item,
        }),
        2 => name_from(&["Soldier", "Acolyte"]).prop_map(|origin| WizardAction::SelectOrigin { origin }),
        3 => (arb_skill(), any::<bool>()).prop_map(|(name, skill)| WizardAction::ToggleOriginBenefit {
            benefit: if skill { OriginBenefit::Skill(name) } else { OriginBenefit::Power(name) },
        }),
        2 => name_from(&["Aldren", "Mirael"]).prop_map(|deity| WizardAction::SelectDeity { deity }),
        2 => name_from(&["Total Courage", "Gentle Healing"]).prop_map(|power| WizardAction::ChooseGrantedPower { power }),
    ]
}

fn check_invariants(state: &WizardState, id: &str) -> Result<(), TestCaseError> {
    let catalog = test_catalog();
    let selection = &state.selection;

    prop_assert_eq!(state.id.as_str(), id);
    if !state.in_hub {
        prop_assert!(
            can_enter(selection, state.current_step, &catalog),
            "standing on locked step {}",
            state.current_step
        );
    }

    prop_assert!(selection.purchases.total_price() <= selection.budget + 1e-9);
    if let Some(class) = &state.draft.class {
        prop_assert!(class.purchases.total_price() <= selection.budget + 1e-9);
    }

    prop_assert!(selection.origin_benefits.len() <= ORIGIN_BENEFIT_COUNT);
    if let Some(origin) = &state.draft.origin {
        prop_assert!(origin.benefits.len() <= ORIGIN_BENEFIT_COUNT);
    }

    prop_assert!(selection.attributes.remaining() >= 0);
    if let Some(attributes) = &state.draft.attributes {
        prop_assert!(attributes.remaining() >= 0);
    }
    Ok(())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Property: Every reachable state keeps the wizard invariants
    #[test]
    fn prop_random_actions_keep_invariants(
        actions in prop::collection::vec(arb_action(), 0..80)
    ) {
        let catalog = test_catalog();
        let rules = test_rules();
        let ctx = RulesContext::new(&catalog, &rules);

        let mut state = WizardState::new(&rules);
        let id = state.id.clone();
        for action in &actions {
            state = apply(&state, action, &ctx);
            check_invariants(&state, &id)?;
        }
    }

    /// Property: A rejected action returns the state unchanged
    #[test]
    fn prop_hub_ignores_step_actions(
        prefix in prop::collection::vec(arb_action(), 0..30),
        action in arb_action()
    ) {
        prop_assume!(!matches!(action, WizardAction::Resume | WizardAction::Discard));

        let catalog = test_catalog();
        let rules = test_rules();
        let ctx = RulesContext::new(&catalog, &rules);

        let state = prefix.iter().fold(WizardState::new(&rules), |s, a| apply(&s, a, &ctx));
        let hub = apply(&state, &WizardAction::OpenHub, &ctx);
        prop_assert!(hub.in_hub);
        prop_assert_eq!(apply(&hub, &action, &ctx), hub);
    }

    /// Property: Replaying the reference build after noise still finalises
    #[test]
    fn prop_discard_then_reference_build_completes(
        noise in prop::collection::vec(arb_action(), 0..40)
    ) {
        let catalog = test_catalog();
        let rules = test_rules();

        let mut actions = noise;
        actions.push(WizardAction::OpenHub);
        actions.push(WizardAction::Discard);
        actions.extend(reference_build_actions());
        let state = build(&actions);

        prop_assert_eq!(state.current_step, WizardStep::Summary);
        prop_assert!(crate::core::character_gen::assembler::assemble(&state.selection, &catalog, &rules).is_ok());
    }
}
