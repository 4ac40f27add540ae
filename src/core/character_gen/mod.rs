//! Character Generation Module
//!
//! Rules engine for building a character step by step.
//!
//! # Components
//!
//! - `attributes` - point-buy costs, rolled pools and racial modifiers
//! - `skills` - trained-skill resolution across race, class, general and origin pools
//! - `inventory` - the bag ledger and equipment references
//! - `catalog` - read-only reference data (races, classes, origins, deities, equipment)
//! - `wizard` - the step state machine and its composition root
//! - `assembler` - turns a confirmed selection into a [`CharacterRecord`]

pub mod assembler;
pub mod attributes;
pub mod catalog;
pub mod inventory;
pub mod skills;
pub mod wizard;

pub use assembler::{assemble, CharacterRecord, DerivedStats};
pub use attributes::{Attribute, AttributeAllocation, AttributeScore, GenerationMode, RacialModifier};
pub use catalog::{Catalog, CatalogError};
pub use inventory::{BagLedger, EquipmentEntry, EquipmentGroup, EquipmentRef};
pub use skills::{OriginBenefit, SkillSource, TrainedSkill};
pub use wizard::{
    CharacterWizard, RulesContext, WizardAction, WizardError, WizardState, WizardStep,
    WizardSummary, WizardView,
};
