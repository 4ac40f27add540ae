//! Character Generation Unit Tests
//!
//! Covers the wizard state machine and the finished record:
//! - Step gating, draft buffering and invalidation on confirm
//! - Point-buy, rolled attributes and "any" racial slots
//! - Class skill pools, class configuration and the purchase budget
//! - Origin benefits and deity powers
//! - Record assembly and derived statistics
//! - Finalisation through a mocked character store
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all character generation tests
//! cargo test tests::unit::character_gen
//!
//! # Run the wizard flow tests only
//! cargo test tests::unit::character_gen::wizard_flow_tests
//! ```

mod assembler_tests;
