//! Common Test Utilities
//!
//! Shared fixtures used across the unit and property test modules:
//! - catalog and rules construction
//! - action scripts that walk the wizard to a given step

pub mod fixtures;

pub use fixtures::*;
