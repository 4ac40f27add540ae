//! Wizard Transitions
//!
//! [`apply`] is the only way a [`WizardState`] changes. It never fails: an
//! action the rules reject returns a state equal to the one passed in.
//!
//! Step predicates come in two flavours:
//! - [`is_step_complete`] looks at the step's draft and gates `Confirm`
//! - [`is_step_confirmed`] looks at the selection and gates entering later steps
//!
//! Both are recomputed from the data on every call, so an upstream change that
//! breaks a downstream choice shows up as that step no longer being confirmed.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::types::{
    ClassConfiguration, ClassDraft, DeityDraft, Invalidation, OriginDraft, WizardAction,
    WizardSelection, WizardState, WizardStep, WizardSummary,
};
use crate::config::RulesConfig;
use crate::core::character_gen::attributes::{roll_pool, Attribute, AttributeAllocation, RacialModifier};
use crate::core::character_gen::catalog::{Catalog, ClassDefinition, OriginDefinition};
use crate::core::character_gen::inventory::BagLedger;
use crate::core::character_gen::skills::{self, OriginBenefit, SkillContext, SkillPicks, ORIGIN_BENEFIT_COUNT};

/// Tolerance when comparing money totals.
const MONEY_EPSILON: f64 = 1e-9;

/// Read-only inputs every transition runs against.
#[derive(Debug, Clone, Copy)]
pub struct RulesContext<'a> {
    pub catalog: &'a Catalog,
    pub rules: &'a RulesConfig,
}

impl<'a> RulesContext<'a> {
    pub fn new(catalog: &'a Catalog, rules: &'a RulesConfig) -> Self {
        Self { catalog, rules }
    }
}

// ============================================================================
// Transition
// ============================================================================

/// Apply one action and return the resulting state.
pub fn apply(state: &WizardState, action: &WizardAction, ctx: &RulesContext<'_>) -> WizardState {
    let mut next = state.clone();

    if state.in_hub {
        match action {
            WizardAction::Resume => resume(&mut next, ctx.catalog),
            WizardAction::Discard => discard(&mut next, ctx.rules),
            _ => {}
        }
    } else {
        match action {
            WizardAction::OpenHub => next.in_hub = true,
            WizardAction::Resume | WizardAction::Discard => {}
            WizardAction::SetName { name } => {
                let name = name.trim();
                next.selection.name = (!name.is_empty()).then(|| name.to_string());
            }
            WizardAction::Back => {
                if let Some(previous) = state.current_step.previous() {
                    next.current_step = previous;
                    enter(&mut next, previous);
                }
            }
            WizardAction::GoTo { step } => {
                if can_enter(&next.selection, *step, ctx.catalog) {
                    next.current_step = *step;
                    enter(&mut next, *step);
                }
            }
            WizardAction::Confirm => confirm(&mut next, ctx.catalog),
            other => {
                if other.step() == Some(state.current_step) {
                    edit(&mut next, other, ctx.catalog);
                }
            }
        }
    }

    if next == *state {
        tracing::trace!(
            wizard_id = %state.id,
            step = %state.current_step,
            action = ?action,
            "Wizard action had no effect"
        );
        return next;
    }

    next.touch();
    tracing::debug!(
        wizard_id = %next.id,
        step = %next.current_step,
        action = ?action,
        "Applied wizard action"
    );
    next
}

fn resume(state: &mut WizardState, catalog: &Catalog) {
    state.in_hub = false;
    if !can_enter(&state.selection, state.current_step, catalog) {
        state.current_step = first_unconfirmed(&state.selection, catalog);
    }
    let step = state.current_step;
    enter(state, step);
}

/// Start over. The wizard keeps its id so a stored draft is overwritten.
fn discard(state: &mut WizardState, rules: &RulesConfig) {
    let fresh = WizardState::new(rules);
    *state = WizardState {
        id: state.id.clone(),
        ..fresh
    };
    tracing::info!(wizard_id = %state.id, "Discarded wizard progress");
}

/// Seed the draft for `step` from the selection if the step has no draft yet.
fn enter(state: &mut WizardState, step: WizardStep) {
    let WizardState {
        selection, draft, ..
    } = state;
    match step {
        WizardStep::RaceSelect => {
            if draft.race.is_none() {
                draft.race = selection.race.clone();
            }
        }
        WizardStep::AttributeAssign => {
            if draft.attributes.is_none() {
                draft.attributes = Some(selection.attributes.clone());
            }
        }
        WizardStep::ClassSelect => {
            if draft.class.is_none() {
                draft.class = selection.class.as_ref().map(|_| class_draft_from(selection));
            }
        }
        WizardStep::OriginSelect => {
            if draft.origin.is_none() {
                draft.origin = selection.origin.as_ref().map(|_| origin_draft_from(selection));
            }
        }
        WizardStep::DeitySelect => {
            if draft.deity.is_none() {
                draft.deity = selection.deity.as_ref().map(|_| deity_draft_from(selection));
            }
        }
        WizardStep::Summary => {}
    }
}

fn class_draft_from(selection: &WizardSelection) -> ClassDraft {
    ClassDraft {
        class: selection.class.clone().unwrap_or_default(),
        configuration: selection.class_configuration.clone(),
        skills: selection.skills.clone(),
        purchases: selection.purchases.clone(),
    }
}

fn origin_draft_from(selection: &WizardSelection) -> OriginDraft {
    OriginDraft {
        origin: selection.origin.clone().unwrap_or_default(),
        benefits: selection.origin_benefits.clone(),
    }
}

fn deity_draft_from(selection: &WizardSelection) -> DeityDraft {
    DeityDraft {
        deity: selection.deity.clone().unwrap_or_default(),
        power: selection.granted_power.clone(),
    }
}

// ============================================================================
// Confirm
// ============================================================================

fn confirm(state: &mut WizardState, catalog: &Catalog) {
    let step = state.current_step;
    if step == WizardStep::Summary || !is_step_complete(state, step, catalog) {
        return;
    }

    let changed = confirmed_value_changes(state, step, catalog);
    if changed {
        for invalidation in step.invalidations() {
            invalidate(state, *invalidation);
        }
    }
    commit_draft(state, step);

    tracing::info!(wizard_id = %state.id, step = %step, changed, "Confirmed wizard step");

    if let Some(next) = step.next() {
        state.current_step = next;
        enter(state, next);
    }
}

/// Whether confirming `step` changes what downstream steps depend on.
fn confirmed_value_changes(state: &WizardState, step: WizardStep, catalog: &Catalog) -> bool {
    let selection = &state.selection;
    let draft = &state.draft;
    match step {
        WizardStep::RaceSelect => draft.race.is_some() && draft.race != selection.race,
        WizardStep::AttributeAssign => {
            let modifiers = race_modifiers(catalog, selection);
            let drafted = draft.attributes.as_ref().unwrap_or(&selection.attributes);
            drafted.total(Attribute::Intelligence, modifiers)
                != selection.attributes.total(Attribute::Intelligence, modifiers)
        }
        WizardStep::ClassSelect => {
            draft.class.as_ref().map(|d| &d.class) != selection.class.as_ref()
        }
        WizardStep::OriginSelect => {
            draft.origin.as_ref().map(|d| &d.origin) != selection.origin.as_ref()
        }
        WizardStep::DeitySelect => {
            draft.deity.as_ref().map(|d| &d.deity) != selection.deity.as_ref()
        }
        WizardStep::Summary => false,
    }
}

/// Reset one downstream field in the selection and in any draft holding it.
fn invalidate(state: &mut WizardState, invalidation: Invalidation) {
    let WizardState {
        id,
        selection,
        draft,
        ..
    } = state;
    tracing::debug!(wizard_id = %id, ?invalidation, "Invalidating downstream choice");

    match invalidation {
        Invalidation::FlexibleSlots => {
            selection.attributes = selection.attributes.clear_slots();
            if let Some(attributes) = draft.attributes.as_mut() {
                *attributes = attributes.clear_slots();
            }
        }
        Invalidation::AttributeConfirmation => selection.attributes_confirmed = false,
        Invalidation::GeneralSkills => {
            selection.skills.general.clear();
            if let Some(class) = draft.class.as_mut() {
                class.skills.general.clear();
            }
        }
        Invalidation::ClassSkills => selection.skills = SkillPicks::default(),
        Invalidation::ClassConfiguration => selection.class_configuration.clear(),
        Invalidation::Purchases => selection.purchases = BagLedger::new(),
        Invalidation::OriginBenefits => selection.origin_benefits.clear(),
        Invalidation::GrantedPower => selection.granted_power = None,
    }
}

fn commit_draft(state: &mut WizardState, step: WizardStep) {
    let WizardState {
        selection, draft, ..
    } = state;
    match step {
        WizardStep::RaceSelect => {
            if let Some(race) = &draft.race {
                selection.race = Some(race.clone());
            }
        }
        WizardStep::AttributeAssign => {
            if let Some(attributes) = &draft.attributes {
                selection.attributes = attributes.clone();
            }
            selection.attributes_confirmed = true;
        }
        WizardStep::ClassSelect => {
            if let Some(class) = &draft.class {
                selection.class = Some(class.class.clone());
                selection.class_configuration = class.configuration.clone();
                selection.skills = class.skills.clone();
                selection.purchases = class.purchases.clone();
            }
        }
        WizardStep::OriginSelect => {
            if let Some(origin) = &draft.origin {
                selection.origin = Some(origin.origin.clone());
                selection.origin_benefits = origin.benefits.clone();
            }
        }
        WizardStep::DeitySelect => {
            if let Some(deity) = &draft.deity {
                selection.deity = Some(deity.deity.clone());
                selection.granted_power = deity.power.clone();
            }
        }
        WizardStep::Summary => {}
    }
}

// ============================================================================
// Step edits
// ============================================================================

fn edit(state: &mut WizardState, action: &WizardAction, catalog: &Catalog) {
    match action {
        WizardAction::SelectRace { race } => {
            if let Some(race) = catalog.race(race) {
                state.draft.race = Some(race.name.clone());
            }
        }

        WizardAction::IncrementAttribute { attribute } => {
            edit_attributes(state, catalog, |a, _| a.increment(*attribute))
        }
        WizardAction::DecrementAttribute { attribute } => {
            edit_attributes(state, catalog, |a, _| a.decrement(*attribute))
        }
        WizardAction::AssignAnySlot { slot, attribute } => {
            edit_attributes(state, catalog, |a, modifiers| a.assign_slot(*slot, *attribute, modifiers))
        }
        WizardAction::SetGenerationMode { mode } => {
            edit_attributes(state, catalog, |a, _| a.with_mode(*mode))
        }
        WizardAction::RollAttributes { seed } => {
            let mut rng = StdRng::seed_from_u64(*seed);
            let pool = roll_pool(&mut rng);
            edit_attributes(state, catalog, |a, _| a.with_rolled_pool(pool))
        }
        WizardAction::AssignRoll { attribute, roll } => {
            edit_attributes(state, catalog, |a, _| a.assign_roll(*attribute, *roll))
        }

        WizardAction::SelectClass { class } => {
            let Some(class) = catalog.class(class) else {
                return;
            };
            if state.draft.class.as_ref().map(|d| d.class.as_str()) == Some(class.name.as_str()) {
                return;
            }
            state.draft.class = Some(if state.selection.class.as_deref() == Some(class.name.as_str()) {
                class_draft_from(&state.selection)
            } else {
                ClassDraft::new(class.name.clone())
            });
        }
        WizardAction::ChooseBasicSkill { .. }
        | WizardAction::ToggleClassSkill { .. }
        | WizardAction::ToggleGeneralSkill { .. }
        | WizardAction::ToggleConfigOption { .. }
        | WizardAction::PurchaseItem { .. }
        | WizardAction::ReturnItem { .. } => edit_class(state, action, catalog),

        WizardAction::SelectOrigin { origin } => {
            let Some(origin) = catalog.origin(origin) else {
                return;
            };
            if state.draft.origin.as_ref().map(|d| d.origin.as_str()) == Some(origin.name.as_str()) {
                return;
            }
            state.draft.origin = Some(if state.selection.origin.as_deref() == Some(origin.name.as_str()) {
                origin_draft_from(&state.selection)
            } else {
                OriginDraft {
                    origin: origin.name.clone(),
                    benefits: Vec::new(),
                }
            });
        }
        WizardAction::ToggleOriginBenefit { benefit } => {
            let Some(draft) = state.draft.origin.as_mut() else {
                return;
            };
            let Some(origin) = catalog.origin(&draft.origin) else {
                return;
            };
            if let Some(benefit) = canonical_benefit(origin, benefit) {
                draft.benefits =
                    skills::toggle_origin_benefit(&draft.benefits, &origin.skills, &origin.powers, &benefit);
            }
        }

        WizardAction::SelectDeity { deity } => {
            let Some(deity) = catalog.deity(deity) else {
                return;
            };
            if state.draft.deity.as_ref().map(|d| d.deity.as_str()) == Some(deity.name.as_str()) {
                return;
            }
            state.draft.deity = Some(if state.selection.deity.as_deref() == Some(deity.name.as_str()) {
                deity_draft_from(&state.selection)
            } else {
                DeityDraft {
                    deity: deity.name.clone(),
                    power: None,
                }
            });
        }
        WizardAction::ChooseGrantedPower { power } => {
            let Some(draft) = state.draft.deity.as_mut() else {
                return;
            };
            let Some(deity) = catalog.deity(&draft.deity) else {
                return;
            };
            if let Some(power) = canonical(&deity.granted_powers, power) {
                draft.power = Some(power.to_string());
            }
        }

        WizardAction::OpenHub
        | WizardAction::Resume
        | WizardAction::Discard
        | WizardAction::Confirm
        | WizardAction::Back
        | WizardAction::GoTo { .. }
        | WizardAction::SetName { .. } => {}
    }
}

fn edit_attributes(
    state: &mut WizardState,
    catalog: &Catalog,
    f: impl FnOnce(&AttributeAllocation, &[RacialModifier]) -> AttributeAllocation,
) {
    let modifiers = race_modifiers(catalog, &state.selection);
    let current = state
        .draft
        .attributes
        .as_ref()
        .unwrap_or(&state.selection.attributes);
    let next = f(current, modifiers);
    state.draft.attributes = Some(next);
}

fn edit_class(state: &mut WizardState, action: &WizardAction, catalog: &Catalog) {
    let WizardState {
        selection, draft, ..
    } = state;
    let Some(draft) = draft.class.as_mut() else {
        return;
    };
    let Some(class) = catalog.class(&draft.class) else {
        return;
    };
    let ctx = skill_context(catalog, selection, class);

    match action {
        WizardAction::ChooseBasicSkill { group, skill } => {
            draft.skills = skills::choose_basic(&ctx, &draft.skills, *group, skill);
        }
        WizardAction::ToggleClassSkill { skill } => {
            draft.skills = skills::toggle_class_skill(&ctx, &draft.skills, skill);
        }
        WizardAction::ToggleGeneralSkill { skill } => {
            draft.skills = skills::toggle_general_skill(&ctx, &draft.skills, skill);
        }
        WizardAction::ToggleConfigOption { key, option } => {
            draft.configuration = toggle_config_option(class, &draft.configuration, key, option);
        }
        WizardAction::PurchaseItem { item, quantity } => {
            let Some(entry) = catalog.find_equipment(item) else {
                return;
            };
            let quantity = (*quantity).max(1);
            let cost = entry.price * f64::from(quantity);
            if draft.purchases.total_price() + cost > selection.budget + MONEY_EPSILON {
                return;
            }
            let item = entry.clone().with_quantity(quantity);
            draft.purchases = draft.purchases.add_equipment(item.group, &[item]);
        }
        WizardAction::ReturnItem { group, item } => {
            let name = catalog
                .find_equipment(item)
                .map(|e| e.name.as_str())
                .unwrap_or(item.as_str());
            draft.purchases = draft.purchases.remove_equipment(*group, name);
        }
        _ => {}
    }
}

fn canonical<'a>(list: &'a [String], name: &str) -> Option<&'a str> {
    let name = name.trim();
    list.iter()
        .find(|s| s.eq_ignore_ascii_case(name))
        .map(String::as_str)
}

fn canonical_benefit(origin: &OriginDefinition, benefit: &OriginBenefit) -> Option<OriginBenefit> {
    match benefit {
        OriginBenefit::Skill(name) => {
            canonical(&origin.skills, name).map(|s| OriginBenefit::Skill(s.to_string()))
        }
        OriginBenefit::Power(name) => {
            canonical(&origin.powers, name).map(|s| OriginBenefit::Power(s.to_string()))
        }
    }
}

// ============================================================================
// Class configuration
// ============================================================================

/// Every requirement has exactly `picks` distinct options from its list.
pub fn configuration_complete(class: &ClassDefinition, configuration: &ClassConfiguration) -> bool {
    class.configuration.iter().all(|requirement| {
        let chosen = configuration
            .get(&requirement.key)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let mut distinct: Vec<&str> = Vec::new();
        for option in chosen {
            if canonical(&requirement.options, option).is_none() || distinct.contains(&option.as_str()) {
                return false;
            }
            distinct.push(option);
        }
        distinct.len() == requirement.picks
    })
}

/// Add `option` under `key`, or remove it if already chosen. Choosing past
/// the requirement's pick count does nothing.
pub fn toggle_config_option(
    class: &ClassDefinition,
    configuration: &ClassConfiguration,
    key: &str,
    option: &str,
) -> ClassConfiguration {
    let mut next = configuration.clone();
    let Some(requirement) = class.requirement(key) else {
        return next;
    };
    let Some(option) = canonical(&requirement.options, option) else {
        return next;
    };

    let chosen = next.entry(requirement.key.clone()).or_default();
    if let Some(pos) = chosen.iter().position(|o| o == option) {
        chosen.remove(pos);
    } else if chosen.len() < requirement.picks {
        chosen.push(option.to_string());
    }
    if chosen.is_empty() {
        next.remove(&requirement.key);
    }
    next
}

// ============================================================================
// Predicates
// ============================================================================

/// Racial modifiers of the confirmed race.
pub fn race_modifiers<'a>(catalog: &'a Catalog, selection: &WizardSelection) -> &'a [RacialModifier] {
    selection
        .race
        .as_deref()
        .and_then(|r| catalog.race(r))
        .map(|r| r.modifiers.as_slice())
        .unwrap_or(&[])
}

/// Skill rules for `class` given the confirmed race and attributes.
pub fn skill_context<'a>(
    catalog: &'a Catalog,
    selection: &WizardSelection,
    class: &'a ClassDefinition,
) -> SkillContext<'a> {
    let racial = selection
        .race
        .as_deref()
        .and_then(|r| catalog.race(r))
        .map(|r| r.skills.as_slice())
        .unwrap_or(&[]);
    SkillContext {
        racial,
        basic_groups: &class.basic_skills,
        class_candidates: &class.class_skills,
        class_picks: class.class_skill_count,
        vocabulary: &catalog.skills,
        intelligence: selection
            .attributes
            .total(Attribute::Intelligence, race_modifiers(catalog, selection)),
    }
}

fn class_choice_complete(
    catalog: &Catalog,
    selection: &WizardSelection,
    class: &str,
    configuration: &ClassConfiguration,
    picks: &SkillPicks,
    purchases: &BagLedger,
) -> bool {
    let Some(class) = catalog.class(class) else {
        return false;
    };
    let ctx = skill_context(catalog, selection, class);
    skills::resolve(&ctx, picks).is_complete()
        && configuration_complete(class, configuration)
        && purchases.total_price() <= selection.budget + MONEY_EPSILON
}

fn origin_choice_complete(catalog: &Catalog, origin: &str, benefits: &[OriginBenefit]) -> bool {
    let Some(origin) = catalog.origin(origin) else {
        return false;
    };
    benefits.len() == ORIGIN_BENEFIT_COUNT
        && benefits.iter().all(|b| canonical_benefit(origin, b).is_some())
}

fn deity_choice_complete(catalog: &Catalog, deity: &str, power: Option<&str>) -> bool {
    match (catalog.deity(deity), power) {
        (Some(deity), Some(power)) => canonical(&deity.granted_powers, power).is_some(),
        _ => false,
    }
}

fn attributes_valid(attributes: &AttributeAllocation) -> bool {
    attributes.is_fully_assigned() && attributes.remaining() >= 0
}

/// Whether the draft of `step` may be confirmed.
pub fn is_step_complete(state: &WizardState, step: WizardStep, catalog: &Catalog) -> bool {
    let selection = &state.selection;
    let draft = &state.draft;
    match step {
        WizardStep::RaceSelect => draft
            .race
            .as_deref()
            .or(selection.race.as_deref())
            .is_some_and(|r| catalog.race(r).is_some()),
        WizardStep::AttributeAssign => {
            attributes_valid(draft.attributes.as_ref().unwrap_or(&selection.attributes))
        }
        WizardStep::ClassSelect => match &draft.class {
            Some(d) => class_choice_complete(
                catalog,
                selection,
                &d.class,
                &d.configuration,
                &d.skills,
                &d.purchases,
            ),
            None => is_step_confirmed(selection, step, catalog),
        },
        WizardStep::OriginSelect => match &draft.origin {
            Some(d) => origin_choice_complete(catalog, &d.origin, &d.benefits),
            None => is_step_confirmed(selection, step, catalog),
        },
        WizardStep::DeitySelect => match &draft.deity {
            Some(d) => deity_choice_complete(catalog, &d.deity, d.power.as_deref()),
            None => is_step_confirmed(selection, step, catalog),
        },
        WizardStep::Summary => is_step_confirmed(selection, step, catalog),
    }
}

/// Whether the selection holds a valid confirmed choice for `step`.
pub fn is_step_confirmed(selection: &WizardSelection, step: WizardStep, catalog: &Catalog) -> bool {
    match step {
        WizardStep::RaceSelect => selection
            .race
            .as_deref()
            .is_some_and(|r| catalog.race(r).is_some()),
        WizardStep::AttributeAssign => {
            selection.attributes_confirmed && attributes_valid(&selection.attributes)
        }
        WizardStep::ClassSelect => selection.class.as_deref().is_some_and(|c| {
            class_choice_complete(
                catalog,
                selection,
                c,
                &selection.class_configuration,
                &selection.skills,
                &selection.purchases,
            )
        }),
        WizardStep::OriginSelect => selection
            .origin
            .as_deref()
            .is_some_and(|o| origin_choice_complete(catalog, o, &selection.origin_benefits)),
        WizardStep::DeitySelect => selection
            .deity
            .as_deref()
            .is_some_and(|d| deity_choice_complete(catalog, d, selection.granted_power.as_deref())),
        WizardStep::Summary => WizardStep::CONFIRMABLE
            .iter()
            .all(|&s| is_step_confirmed(selection, s, catalog)),
    }
}

/// The earliest step without a confirmed choice, or `Summary`.
pub fn first_unconfirmed(selection: &WizardSelection, catalog: &Catalog) -> WizardStep {
    WizardStep::CONFIRMABLE
        .iter()
        .copied()
        .find(|&s| !is_step_confirmed(selection, s, catalog))
        .unwrap_or(WizardStep::Summary)
}

/// A step can be entered once every step before it is confirmed.
pub fn can_enter(selection: &WizardSelection, step: WizardStep, catalog: &Catalog) -> bool {
    step.index() <= first_unconfirmed(selection, catalog).index()
}

pub fn progress_percent(selection: &WizardSelection, catalog: &Catalog) -> u8 {
    let confirmed = WizardStep::CONFIRMABLE
        .iter()
        .filter(|&&s| is_step_confirmed(selection, s, catalog))
        .count();
    (confirmed * 100 / WizardStep::CONFIRMABLE.len()) as u8
}

pub fn summarize(state: &WizardState, catalog: &Catalog) -> WizardSummary {
    WizardSummary {
        id: state.id.clone(),
        name: state.selection.name.clone(),
        race: state.selection.race.clone(),
        class: state.selection.class.clone(),
        current_step: state.current_step,
        progress_percent: progress_percent(&state.selection, catalog),
        created_at: state.created_at.clone(),
        updated_at: state.updated_at.clone(),
    }
}
