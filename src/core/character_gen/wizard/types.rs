//! Wizard Domain Types
//!
//! Defines the core domain types for the character-build wizard:
//! - [`WizardStep`]: the ordered steps and what each confirm invalidates
//! - [`WizardSelection`]: confirmed, cross-step character state
//! - [`WizardDraft`]: per-step scratch state that has not been confirmed
//! - [`WizardState`]: selection + draft + position, the unit that is persisted
//! - [`WizardAction`]: every input the state machine accepts
//! - [`WizardError`]: errors for finalisation and persistence
//!
//! # Architecture
//!
//! Drafts and the selection are deliberately separate. Editing a step only
//! touches its draft; the draft is copied into the selection on an explicit
//! confirm. Going back keeps later drafts, and going forward never commits
//! an incomplete step.
//!
//! # Serialization
//!
//! All types implement `Serialize` and `Deserialize`. Actions use an internal
//! `"action"` tag so scripts and frontends can send them as plain JSON:
//!
//! ```json
//! { "action": "select_race", "race": "Elf" }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::core::character_gen::attributes::{Attribute, AttributeAllocation, GenerationMode};
use crate::core::character_gen::inventory::{BagLedger, EquipmentGroup};
use crate::core::character_gen::skills::{OriginBenefit, SkillPicks};
use crate::core::storage::StoreError;

// ============================================================================
// Steps
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    RaceSelect,
    AttributeAssign,
    ClassSelect,
    OriginSelect,
    DeitySelect,
    Summary,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::RaceSelect,
        WizardStep::AttributeAssign,
        WizardStep::ClassSelect,
        WizardStep::OriginSelect,
        WizardStep::DeitySelect,
        WizardStep::Summary,
    ];

    /// Steps that hold a confirmable choice.
    pub const CONFIRMABLE: [WizardStep; 5] = [
        WizardStep::RaceSelect,
        WizardStep::AttributeAssign,
        WizardStep::ClassSelect,
        WizardStep::OriginSelect,
        WizardStep::DeitySelect,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Option<WizardStep> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<WizardStep> {
        self.index().checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::RaceSelect => "race_select",
            WizardStep::AttributeAssign => "attribute_assign",
            WizardStep::ClassSelect => "class_select",
            WizardStep::OriginSelect => "origin_select",
            WizardStep::DeitySelect => "deity_select",
            WizardStep::Summary => "summary",
        }
    }

    /// Downstream fields cleared when confirming this step changes its value.
    pub fn invalidations(&self) -> &'static [Invalidation] {
        match self {
            WizardStep::RaceSelect => &[
                Invalidation::FlexibleSlots,
                Invalidation::AttributeConfirmation,
                Invalidation::GeneralSkills,
            ],
            WizardStep::AttributeAssign => &[Invalidation::GeneralSkills],
            WizardStep::ClassSelect => &[
                Invalidation::ClassSkills,
                Invalidation::ClassConfiguration,
                Invalidation::Purchases,
            ],
            WizardStep::OriginSelect => &[Invalidation::OriginBenefits],
            WizardStep::DeitySelect => &[Invalidation::GrantedPower],
            WizardStep::Summary => &[],
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WizardStep {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .find(|s| s.as_str() == value)
            .copied()
            .ok_or_else(|| format!("unknown wizard step: {value}"))
    }
}

/// A downstream field a confirm can reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invalidation {
    /// "Any" racial modifier slot assignments (slot indices are per race)
    FlexibleSlots,
    /// The attribute step must be confirmed again
    AttributeConfirmation,
    /// General-pool skills (pool size follows intelligence)
    GeneralSkills,
    /// Basic, class and general skill picks
    ClassSkills,
    ClassConfiguration,
    Purchases,
    OriginBenefits,
    GrantedPower,
}

// ============================================================================
// Selection and Draft
// ============================================================================

/// Class sub-configuration: requirement key -> chosen options.
pub type ClassConfiguration = BTreeMap<String, Vec<String>>;

/// Confirmed cross-step state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardSelection {
    pub name: Option<String>,
    pub race: Option<String>,
    pub attributes: AttributeAllocation,
    pub attributes_confirmed: bool,
    pub class: Option<String>,
    pub class_configuration: ClassConfiguration,
    pub skills: SkillPicks,
    pub origin: Option<String>,
    pub origin_benefits: Vec<OriginBenefit>,
    pub deity: Option<String>,
    pub granted_power: Option<String>,
    /// Starting purchases
    pub purchases: BagLedger,
    /// Money available for purchases
    pub budget: f64,
}

impl Default for WizardSelection {
    fn default() -> Self {
        Self::new(RulesConfig::default().starting_money)
    }
}

impl WizardSelection {
    pub fn new(budget: f64) -> Self {
        Self {
            name: None,
            race: None,
            attributes: AttributeAllocation::default(),
            attributes_confirmed: false,
            class: None,
            class_configuration: ClassConfiguration::new(),
            skills: SkillPicks::default(),
            origin: None,
            origin_benefits: Vec::new(),
            deity: None,
            granted_power: None,
            purchases: BagLedger::new(),
            budget,
        }
    }

    pub fn money_spent(&self) -> f64 {
        self.purchases.total_price()
    }

    pub fn money_remaining(&self) -> f64 {
        self.budget - self.money_spent()
    }
}

/// In-progress class step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassDraft {
    pub class: String,
    pub configuration: ClassConfiguration,
    pub skills: SkillPicks,
    pub purchases: BagLedger,
}

impl ClassDraft {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            ..Default::default()
        }
    }
}

/// In-progress origin step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginDraft {
    pub origin: String,
    pub benefits: Vec<OriginBenefit>,
}

/// In-progress deity step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeityDraft {
    pub deity: String,
    pub power: Option<String>,
}

/// Per-step scratch state. `None` means the step has not been entered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardDraft {
    pub race: Option<String>,
    pub attributes: Option<AttributeAllocation>,
    pub class: Option<ClassDraft>,
    pub origin: Option<OriginDraft>,
    pub deity: Option<DeityDraft>,
}

// ============================================================================
// WizardState
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    /// Unique identifier
    pub id: String,
    /// Current step in the wizard
    pub current_step: WizardStep,
    /// Resume/discard hub is showing
    pub in_hub: bool,
    pub selection: WizardSelection,
    pub draft: WizardDraft,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl WizardState {
    pub fn new(rules: &RulesConfig) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            current_step: WizardStep::RaceSelect,
            in_hub: false,
            selection: WizardSelection::new(rules.starting_money),
            draft: WizardDraft::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Every input the wizard accepts. Step-specific actions only apply while
/// their step is current; anywhere else they are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WizardAction {
    // Hub and navigation
    OpenHub,
    Resume,
    Discard,
    Confirm,
    Back,
    GoTo { step: WizardStep },
    SetName { name: String },

    // RaceSelect
    SelectRace { race: String },

    // AttributeAssign
    IncrementAttribute { attribute: Attribute },
    DecrementAttribute { attribute: Attribute },
    AssignAnySlot { slot: usize, attribute: Option<Attribute> },
    SetGenerationMode { mode: GenerationMode },
    RollAttributes { seed: u64 },
    AssignRoll { attribute: Attribute, roll: Option<usize> },

    // ClassSelect
    SelectClass { class: String },
    ChooseBasicSkill { group: usize, skill: String },
    ToggleClassSkill { skill: String },
    ToggleGeneralSkill { skill: String },
    ToggleConfigOption { key: String, option: String },
    PurchaseItem { item: String, #[serde(default)] quantity: u32 },
    ReturnItem { group: EquipmentGroup, item: String },

    // OriginSelect
    SelectOrigin { origin: String },
    ToggleOriginBenefit { benefit: OriginBenefit },

    // DeitySelect
    SelectDeity { deity: String },
    ChooseGrantedPower { power: String },
}

impl WizardAction {
    /// The step this action edits, if it is step-specific.
    pub fn step(&self) -> Option<WizardStep> {
        use WizardAction::*;
        match self {
            OpenHub | Resume | Discard | Confirm | Back | GoTo { .. } | SetName { .. } => None,
            SelectRace { .. } => Some(WizardStep::RaceSelect),
            IncrementAttribute { .. }
            | DecrementAttribute { .. }
            | AssignAnySlot { .. }
            | SetGenerationMode { .. }
            | RollAttributes { .. }
            | AssignRoll { .. } => Some(WizardStep::AttributeAssign),
            SelectClass { .. }
            | ChooseBasicSkill { .. }
            | ToggleClassSkill { .. }
            | ToggleGeneralSkill { .. }
            | ToggleConfigOption { .. }
            | PurchaseItem { .. }
            | ReturnItem { .. } => Some(WizardStep::ClassSelect),
            SelectOrigin { .. } | ToggleOriginBenefit { .. } => Some(WizardStep::OriginSelect),
            SelectDeity { .. } | ChooseGrantedPower { .. } => Some(WizardStep::DeitySelect),
        }
    }
}

// ============================================================================
// Summary and Errors
// ============================================================================

/// Summary of a wizard state for the resume hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSummary {
    pub id: String,
    pub name: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub current_step: WizardStep,
    pub progress_percent: u8,
    pub created_at: String,
    pub updated_at: String,
}

/// Errors that can occur finalising or storing a character.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Step not confirmed: {0}")]
    Incomplete(WizardStep),

    #[error("Unknown {kind}: {name}")]
    UnknownReference { kind: &'static str, name: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
