//! Unit Tests
//!
//! Organized by module:
//! - `character_gen` - wizard flow, record assembly, composition root
//! - `storage_tests` - character and draft stores

mod character_gen;
