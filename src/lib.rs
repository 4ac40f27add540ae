/// Character Forge - guided character-build rules engine
///
/// Core library providing the character-creation wizard, attribute and skill
/// rules, the inventory ledger and final character assembly for tabletop
/// RPG systems.

pub mod config;
pub mod core;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
