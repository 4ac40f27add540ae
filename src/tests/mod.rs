//! Crate test suite
//!
//! - `common` - shared fixtures and action scripts
//! - `unit` - scenario tests per module
//! - `property` - proptest invariants

mod common;
mod unit;
