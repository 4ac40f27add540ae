//! Wizard State Machine for Character Creation
//!
//! Sequences the build steps, buffers per-step drafts and gates each step on
//! its completion rules.
//!
//! # Overview
//!
//! The wizard walks the player through:
//! 1. Race - race choice; clears "any" attribute slots when it changes
//! 2. Attributes - point-buy or rolled values plus "any" slot placement
//! 3. Class - skill pools, class configuration and starting purchases
//! 4. Origin - exactly two benefits
//! 5. Deity - exactly one granted power
//! 6. Summary - hand-off to the character store
//!
//! # Design Principles
//!
//! - **Pure transitions**: `(state, action) -> state`, see [`machine::apply`]
//! - **Drafts**: edits stay in the step draft until confirmed
//! - **Declared invalidation**: each step lists what its confirm resets
//! - **Recoverable**: snapshots restore leniently and open on the hub

mod types;
mod manager;
pub mod machine;
pub mod snapshot;
pub mod view;

pub use types::*;
pub use manager::*;
pub use machine::RulesContext;
pub use view::WizardView;
