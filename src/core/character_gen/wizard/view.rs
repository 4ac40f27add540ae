//! Read model handed to the presentation layer.
//!
//! Everything here is derived from a [`WizardState`] and the catalog; nothing
//! is stored.

use std::collections::BTreeMap;

use serde::Serialize;

use super::machine::{
    can_enter, configuration_complete, is_step_complete, is_step_confirmed, progress_percent,
    race_modifiers, skill_context,
};
use super::types::{ClassConfiguration, WizardState, WizardStep};
use crate::core::character_gen::attributes::{Attribute, AttributeScore, GenerationMode};
use crate::core::character_gen::catalog::Catalog;
use crate::core::character_gen::inventory::{BagLedger, EquipmentEntry};
use crate::core::character_gen::skills::{self, OriginBenefit, SkillPicks, TrainedSkill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// The selection holds a valid choice
    Confirmed,
    /// The draft can be confirmed
    Complete,
    /// Reachable but not ready
    Open,
    /// An earlier step still needs confirming
    Locked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepView {
    pub step: WizardStep,
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnySlotView {
    pub slot: usize,
    pub value: i8,
    pub assigned: Option<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributesView {
    pub mode: GenerationMode,
    pub spent: i32,
    pub remaining: i32,
    pub scores: BTreeMap<Attribute, AttributeScore>,
    pub any_slots: Vec<AnySlotView>,
    pub rolled_pool: Vec<i8>,
    pub fully_assigned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassView {
    pub name: String,
    pub trained: Vec<TrainedSkill>,
    pub basic_pending: usize,
    pub class_chosen: usize,
    pub class_required: usize,
    pub general_chosen: usize,
    pub general_required: usize,
    pub class_options: Vec<String>,
    pub general_options: Vec<String>,
    pub configuration: ClassConfiguration,
    pub configuration_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginView {
    pub name: String,
    pub benefits: Vec<OriginBenefit>,
    pub advisories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeityView {
    pub name: String,
    pub power: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneyView {
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BagView {
    pub spaces: f64,
    pub armor_penalty: i32,
    pub entries: Vec<EquipmentEntry>,
}

impl From<&BagLedger> for BagView {
    fn from(bag: &BagLedger) -> Self {
        Self {
            spaces: bag.spaces(),
            armor_penalty: bag.armor_penalty(),
            entries: bag.entries().cloned().collect(),
        }
    }
}

/// What a frontend needs to draw the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardView {
    pub id: String,
    pub name: Option<String>,
    pub in_hub: bool,
    pub current_step: WizardStep,
    pub steps: Vec<StepView>,
    pub progress_percent: u8,
    pub can_confirm: bool,
    pub can_go_back: bool,
    /// Every step is confirmed and the character can be finalised
    pub can_finalize: bool,
    pub race: Option<String>,
    pub attributes: AttributesView,
    pub class: Option<ClassView>,
    pub origin: Option<OriginView>,
    pub deity: Option<DeityView>,
    pub money: MoneyView,
    pub bag: BagView,
}

impl WizardView {
    pub fn build(state: &WizardState, catalog: &Catalog) -> Self {
        let selection = &state.selection;
        let draft = &state.draft;

        let steps = WizardStep::ALL
            .iter()
            .map(|&step| StepView {
                step,
                status: step_status(state, step, catalog),
            })
            .collect();

        let can_finalize = is_step_confirmed(selection, WizardStep::Summary, catalog);
        let can_confirm = !state.in_hub
            && state.current_step != WizardStep::Summary
            && is_step_complete(state, state.current_step, catalog);

        let purchases = draft
            .class
            .as_ref()
            .map(|c| &c.purchases)
            .unwrap_or(&selection.purchases);
        let spent = purchases.total_price();

        Self {
            id: state.id.clone(),
            name: selection.name.clone(),
            in_hub: state.in_hub,
            current_step: state.current_step,
            steps,
            progress_percent: progress_percent(selection, catalog),
            can_confirm,
            can_go_back: !state.in_hub && state.current_step.previous().is_some(),
            can_finalize,
            race: draft.race.clone().or_else(|| selection.race.clone()),
            attributes: attributes_view(state, catalog),
            class: class_view(state, catalog),
            origin: origin_view(state, catalog),
            deity: draft
                .deity
                .as_ref()
                .map(|d| DeityView {
                    name: d.deity.clone(),
                    power: d.power.clone(),
                })
                .or_else(|| {
                    selection.deity.as_ref().map(|name| DeityView {
                        name: name.clone(),
                        power: selection.granted_power.clone(),
                    })
                }),
            money: MoneyView {
                budget: selection.budget,
                spent,
                remaining: selection.budget - spent,
            },
            bag: BagView::from(purchases),
        }
    }
}

fn step_status(state: &WizardState, step: WizardStep, catalog: &Catalog) -> StepStatus {
    if step != WizardStep::Summary && is_step_confirmed(&state.selection, step, catalog) {
        StepStatus::Confirmed
    } else if !can_enter(&state.selection, step, catalog) {
        StepStatus::Locked
    } else if is_step_complete(state, step, catalog) {
        StepStatus::Complete
    } else {
        StepStatus::Open
    }
}

fn attributes_view(state: &WizardState, catalog: &Catalog) -> AttributesView {
    let allocation = state
        .draft
        .attributes
        .as_ref()
        .unwrap_or(&state.selection.attributes);
    let modifiers = race_modifiers(catalog, &state.selection);

    let any_slots = modifiers
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_any())
        .map(|(slot, m)| AnySlotView {
            slot,
            value: m.value,
            assigned: allocation.slot_assignments.get(&slot).copied(),
        })
        .collect();

    AttributesView {
        mode: allocation.mode,
        spent: allocation.spent(),
        remaining: allocation.remaining(),
        scores: allocation.scores(modifiers),
        any_slots,
        rolled_pool: allocation.rolled_pool.clone(),
        fully_assigned: allocation.is_fully_assigned(),
    }
}

fn class_view(state: &WizardState, catalog: &Catalog) -> Option<ClassView> {
    let selection = &state.selection;
    let (name, picks, configuration): (&str, &SkillPicks, &ClassConfiguration) =
        match &state.draft.class {
            Some(d) => (d.class.as_str(), &d.skills, &d.configuration),
            None => (
                selection.class.as_deref()?,
                &selection.skills,
                &selection.class_configuration,
            ),
        };
    let class = catalog.class(name)?;
    let ctx = skill_context(catalog, selection, class);
    let resolution = skills::resolve(&ctx, picks);

    Some(ClassView {
        name: class.name.clone(),
        trained: resolution.trained.clone(),
        basic_pending: resolution.basic_pending,
        class_chosen: resolution.class_chosen,
        class_required: resolution.class_required,
        general_chosen: resolution.general_chosen,
        general_required: resolution.general_required,
        class_options: skills::class_options(&ctx, picks),
        general_options: skills::general_options(&ctx, picks),
        configuration: configuration.clone(),
        configuration_complete: configuration_complete(class, configuration),
    })
}

fn origin_view(state: &WizardState, catalog: &Catalog) -> Option<OriginView> {
    let selection = &state.selection;
    let (name, benefits) = match &state.draft.origin {
        Some(d) => (d.origin.clone(), d.benefits.clone()),
        None => (selection.origin.clone()?, selection.origin_benefits.clone()),
    };

    // Advisories compare against the confirmed class skills, or the racial
    // skills alone while no class is confirmed.
    let resolution = match selection.class.as_deref().and_then(|c| catalog.class(c)) {
        Some(class) => skills::resolve(&skill_context(catalog, selection, class), &selection.skills),
        None => skills::resolve_racial(
            selection
                .race
                .as_deref()
                .and_then(|r| catalog.race(r))
                .map(|r| r.skills.as_slice())
                .unwrap_or(&[]),
        ),
    };
    let advisories = skills::origin_advisories(&resolution, &benefits)
        .iter()
        .map(ToString::to_string)
        .collect();

    Some(OriginView {
        name,
        benefits,
        advisories,
    })
}
