//! Reference Catalogs
//!
//! Read-only lookup tables for races, classes, origins, deities, equipment and
//! the skill vocabulary. The rules engine consumes these but never mutates them.
//!
//! Catalogs load from JSON; [`Catalog::builtin`] provides a small sample
//! ruleset used by the CLI and the tests.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attributes::{Attribute, RacialModifier};
use super::inventory::{EquipmentEntry, EquipmentGroup, EquipmentRef};
use super::skills::SkillGroup;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog references unknown skills: {}", .0.join(", "))]
    UnknownSkills(Vec<String>),
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modifiers: Vec<RacialModifier>,
    /// Skills every member of the race is trained in
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub powers: Vec<String>,
}

impl RaceDefinition {
    /// Indices of the "any" modifier slots.
    pub fn any_slots(&self) -> Vec<usize> {
        self.modifiers
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_any())
            .map(|(i, _)| i)
            .collect()
    }
}

fn default_picks() -> usize {
    1
}

/// A class sub-configuration the player must complete, e.g. a caster path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequirement {
    pub key: String,
    #[serde(default)]
    pub label: String,
    pub options: Vec<String>,
    #[serde(default = "default_picks")]
    pub picks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub initial_hit_points: i32,
    #[serde(default)]
    pub mana_per_level: i32,
    #[serde(default)]
    pub basic_skills: Vec<SkillGroup>,
    #[serde(default)]
    pub class_skills: Vec<String>,
    #[serde(default)]
    pub class_skill_count: usize,
    #[serde(default)]
    pub configuration: Vec<ConfigRequirement>,
    #[serde(default)]
    pub starting_items: Vec<EquipmentRef>,
}

impl ClassDefinition {
    pub fn needs_configuration(&self) -> bool {
        !self.configuration.is_empty()
    }

    pub fn requirement(&self, key: &str) -> Option<&ConfigRequirement> {
        self.configuration.iter().find(|r| r.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Skills offered as benefits
    #[serde(default)]
    pub skills: Vec<String>,
    /// Powers offered as benefits
    #[serde(default)]
    pub powers: Vec<String>,
    #[serde(default)]
    pub items: Vec<EquipmentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeityDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub granted_powers: Vec<String>,
}

trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(RaceDefinition, ClassDefinition, OriginDefinition, DeityDefinition, EquipmentEntry);

fn find<'a, T: Named>(items: &'a [T], name: &str) -> Option<&'a T> {
    let name = name.trim();
    items.iter().find(|item| item.name().eq_ignore_ascii_case(name))
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub races: Vec<RaceDefinition>,
    pub classes: Vec<ClassDefinition>,
    pub origins: Vec<OriginDefinition>,
    pub deities: Vec<DeityDefinition>,
    pub equipment: Vec<EquipmentEntry>,
    pub skills: Vec<String>,
}

impl Catalog {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_json_str(&contents)?;
        tracing::info!(
            path = %path.as_ref().display(),
            races = catalog.races.len(),
            classes = catalog.classes.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    pub fn race(&self, name: &str) -> Option<&RaceDefinition> {
        find(&self.races, name)
    }

    pub fn class(&self, name: &str) -> Option<&ClassDefinition> {
        find(&self.classes, name)
    }

    pub fn origin(&self, name: &str) -> Option<&OriginDefinition> {
        find(&self.origins, name)
    }

    pub fn deity(&self, name: &str) -> Option<&DeityDefinition> {
        find(&self.deities, name)
    }

    pub fn find_equipment(&self, name: &str) -> Option<&EquipmentEntry> {
        find(&self.equipment, name)
    }

    /// Canonical spelling of a vocabulary skill.
    pub fn skill(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.skills
            .iter()
            .find(|s| s.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    /// Resolve an equipment reference into a full entry.
    ///
    /// Names missing from the catalog become a zero-price placeholder taking
    /// `placeholder_space`.
    pub fn resolve_equipment(&self, item: &EquipmentRef, placeholder_space: f64) -> EquipmentEntry {
        match item {
            EquipmentRef::Full(entry) => entry.clone(),
            EquipmentRef::ByName(name) => match self.find_equipment(name) {
                Some(entry) => entry.clone(),
                None => {
                    tracing::warn!(item = %name, "Equipment not in catalog, using placeholder");
                    EquipmentEntry::placeholder(name.clone(), placeholder_space)
                }
            },
        }
    }

    /// Check that every skill a class or origin mentions exists in the vocabulary.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut unknown: Vec<String> = Vec::new();
        let mut check = |skill: &String| {
            if self.skill(skill).is_none() && !unknown.contains(skill) {
                unknown.push(skill.clone());
            }
        };

        for race in &self.races {
            race.skills.iter().for_each(&mut check);
        }
        for class in &self.classes {
            class.class_skills.iter().for_each(&mut check);
            for group in &class.basic_skills {
                match group {
                    SkillGroup::Fixed { skills } => skills.iter().for_each(&mut check),
                    SkillGroup::Choice { options } => options.iter().for_each(&mut check),
                }
            }
        }
        for origin in &self.origins {
            origin.skills.iter().for_each(&mut check);
        }

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::UnknownSkills(unknown))
        }
    }

    /// Sample ruleset shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            races: builtin_races(),
            classes: builtin_classes(),
            origins: builtin_origins(),
            deities: builtin_deities(),
            equipment: builtin_equipment(),
            skills: strings(&[
                "Acrobatics", "Animal Handling", "Athletics", "Acting", "Riding", "Knowledge",
                "Healing", "Diplomacy", "Deception", "Stealth", "War", "Initiative",
                "Intimidation", "Intuition", "Investigation", "Gambling", "Thievery", "Fighting",
                "Mysticism", "Nobility", "Trade", "Perception", "Piloting", "Aim", "Reflexes",
                "Religion", "Survival", "Will", "Fortitude",
            ]),
        }
    }
}

// ============================================================================
// Built-in Content
// ============================================================================

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn refs(items: &[&str]) -> Vec<EquipmentRef> {
    items.iter().map(|&s| EquipmentRef::from(s)).collect()
}

fn builtin_races() -> Vec<RaceDefinition> {
    use Attribute::*;
    vec![
        RaceDefinition {
            name: "Human".to_string(),
            description: "Ambitious and adaptable".to_string(),
            modifiers: vec![RacialModifier::any(1), RacialModifier::any(1), RacialModifier::any(1)],
            skills: vec![],
            powers: strings(&["Versatile"]),
        },
        RaceDefinition {
            name: "Dwarf".to_string(),
            description: "Stout folk of the deep halls".to_string(),
            modifiers: vec![
                RacialModifier::fixed(Constitution, 2),
                RacialModifier::fixed(Wisdom, 1),
                RacialModifier::fixed(Dexterity, -1),
            ],
            skills: vec![],
            powers: strings(&["Darkvision", "Slow and Steady"]),
        },
        RaceDefinition {
            name: "Elf".to_string(),
            description: "Graceful and long-lived".to_string(),
            modifiers: vec![
                RacialModifier::fixed(Intelligence, 2),
                RacialModifier::fixed(Dexterity, 1),
                RacialModifier::fixed(Constitution, -1),
            ],
            skills: strings(&["Perception"]),
            powers: strings(&["Elven Senses"]),
        },
        RaceDefinition {
            name: "Goblin".to_string(),
            description: "Quick, clever and underestimated".to_string(),
            modifiers: vec![
                RacialModifier::fixed(Dexterity, 2),
                RacialModifier::fixed(Intelligence, 1),
                RacialModifier::fixed(Charisma, -1),
            ],
            skills: strings(&["Stealth"]),
            powers: strings(&["Darkvision", "Scrounger"]),
        },
        RaceDefinition {
            name: "Half-Giant".to_string(),
            description: "Huge and hardy".to_string(),
            modifiers: vec![
                RacialModifier::fixed(Strength, 2),
                RacialModifier::any(1),
                RacialModifier::fixed(Wisdom, -1),
            ],
            skills: vec![],
            powers: strings(&["Mighty Build"]),
        },
    ]
}

fn builtin_classes() -> Vec<ClassDefinition> {
    vec![
        ClassDefinition {
            name: "Warrior".to_string(),
            description: "Master of arms and armor".to_string(),
            initial_hit_points: 20,
            mana_per_level: 3,
            basic_skills: vec![
                SkillGroup::Choice {
                    options: strings(&["Fighting", "Aim"]),
                },
                SkillGroup::Fixed {
                    skills: strings(&["Fortitude"]),
                },
            ],
            class_skills: strings(&[
                "Animal Handling", "Athletics", "Riding", "War", "Initiative", "Intimidation",
                "Fighting", "Trade", "Perception", "Aim", "Reflexes",
            ]),
            class_skill_count: 2,
            configuration: vec![],
            starting_items: refs(&["Longsword", "Chainmail", "Heavy Shield", "Backpack", "Bedroll"]),
        },
        ClassDefinition {
            name: "Arcanist".to_string(),
            description: "Wielder of arcane power".to_string(),
            initial_hit_points: 8,
            mana_per_level: 6,
            basic_skills: vec![SkillGroup::Fixed {
                skills: strings(&["Mysticism", "Will"]),
            }],
            class_skills: strings(&[
                "Knowledge", "Diplomacy", "Deception", "War", "Initiative", "Intuition",
                "Investigation", "Nobility", "Trade", "Perception",
            ]),
            class_skill_count: 2,
            configuration: vec![
                ConfigRequirement {
                    key: "path".to_string(),
                    label: "Arcane path".to_string(),
                    options: strings(&["Mage", "Sorcerer", "Wizard"]),
                    picks: 1,
                },
                ConfigRequirement {
                    key: "spells".to_string(),
                    label: "Initial spells".to_string(),
                    options: strings(&[
                        "Arcane Armor", "Magic Missile", "Sleep", "Illusory Disguise",
                        "Light", "Mental Dart",
                    ]),
                    picks: 3,
                },
            ],
            starting_items: refs(&["Staff", "Spellbook", "Backpack"]),
        },
        ClassDefinition {
            name: "Cleric".to_string(),
            description: "Servant of the gods".to_string(),
            initial_hit_points: 16,
            mana_per_level: 5,
            basic_skills: vec![SkillGroup::Fixed {
                skills: strings(&["Religion", "Will"]),
            }],
            class_skills: strings(&[
                "Knowledge", "Healing", "Diplomacy", "Fortitude", "Initiative", "Intuition",
                "Fighting", "Mysticism", "Nobility", "Trade", "Perception",
            ]),
            class_skill_count: 2,
            configuration: vec![ConfigRequirement {
                key: "spells".to_string(),
                label: "Initial spells".to_string(),
                options: strings(&["Bless", "Cure Wounds", "Command", "Divine Shield", "Sanctuary"]),
                picks: 3,
            }],
            starting_items: refs(&["Mace", "Scale Mail", "Holy Symbol", "Backpack"]),
        },
        ClassDefinition {
            name: "Rogue".to_string(),
            description: "Quick hands, quicker wits".to_string(),
            initial_hit_points: 12,
            mana_per_level: 4,
            basic_skills: vec![SkillGroup::Fixed {
                skills: strings(&["Thievery", "Reflexes"]),
            }],
            class_skills: strings(&[
                "Acrobatics", "Athletics", "Acting", "Knowledge", "Diplomacy", "Deception",
                "Stealth", "Initiative", "Intimidation", "Intuition", "Investigation",
                "Gambling", "Fighting", "Trade", "Perception", "Piloting", "Aim",
            ]),
            class_skill_count: 8,
            configuration: vec![],
            starting_items: refs(&["Dagger", "Shortbow", "Arrows", "Leather Armor", "Thieves' Tools"]),
        },
    ]
}

fn builtin_origins() -> Vec<OriginDefinition> {
    vec![
        OriginDefinition {
            name: "Acolyte".to_string(),
            description: "Raised in a temple".to_string(),
            skills: strings(&["Healing", "Religion", "Will"]),
            powers: strings(&["Medicine", "Devoted Faith"]),
            items: refs(&["Holy Symbol", "Priestly Vestments"]),
        },
        OriginDefinition {
            name: "Soldier".to_string(),
            description: "Served in a standing army".to_string(),
            skills: strings(&["Fighting", "Fortitude", "War"]),
            powers: strings(&["Military Influence", "Weapon Drill"]),
            items: refs(&["Shortsword", "Uniform"]),
        },
        OriginDefinition {
            name: "Scholar".to_string(),
            description: "Years spent among books".to_string(),
            skills: strings(&["Knowledge", "Investigation", "Mysticism"]),
            powers: strings(&["Well Read"]),
            items: refs(&["Ink and Quill", "Spellbook"]),
        },
        OriginDefinition {
            name: "Hermit".to_string(),
            description: "Lived apart from others".to_string(),
            skills: strings(&["Mysticism", "Religion", "Survival"]),
            powers: strings(&["Solitude", "Herbalism"]),
            items: refs(&["Bedroll", "Healer's Kit"]),
        },
    ]
}

fn builtin_deities() -> Vec<DeityDefinition> {
    vec![
        DeityDefinition {
            name: "Aldren".to_string(),
            description: "Keeper of law and balance".to_string(),
            granted_powers: strings(&["Total Courage", "Gift of Truth", "Righteous Blade"]),
        },
        DeityDefinition {
            name: "Mirael".to_string(),
            description: "Mother of mercy and healing".to_string(),
            granted_powers: strings(&["Gentle Healing", "Gift of Hope", "Purifying Hands"]),
        },
        DeityDefinition {
            name: "Vashti".to_string(),
            description: "The arcane flame".to_string(),
            granted_powers: strings(&["Mana Blessing", "Magic Spark", "Arcane Shield"]),
        },
        DeityDefinition {
            name: "Korran".to_string(),
            description: "Patron of ambition and freedom".to_string(),
            granted_powers: strings(&["Reach the Impossible", "Weapons of Ambition", "Divine Freedom"]),
        },
    ]
}

fn builtin_equipment() -> Vec<EquipmentEntry> {
    use EquipmentGroup::*;
    vec![
        EquipmentEntry::new("Dagger", Weapon, 1.0, 2.0),
        EquipmentEntry::new("Shortsword", Weapon, 1.0, 10.0),
        EquipmentEntry::new("Longsword", Weapon, 1.0, 15.0),
        EquipmentEntry::new("Mace", Weapon, 1.0, 12.0),
        EquipmentEntry::new("Staff", Weapon, 2.0, 0.5),
        EquipmentEntry::new("Shortbow", Weapon, 1.0, 30.0),
        EquipmentEntry::new("Arrows", Weapon, 1.0, 1.0),
        EquipmentEntry::new("Leather Armor", Armor, 2.0, 20.0).with_armor(2, 0),
        EquipmentEntry::new("Studded Leather", Armor, 2.0, 35.0).with_armor(3, 1),
        EquipmentEntry::new("Scale Mail", Armor, 5.0, 60.0).with_armor(4, 2),
        EquipmentEntry::new("Chainmail", Armor, 5.0, 150.0).with_armor(6, 2),
        EquipmentEntry::new("Light Shield", Shield, 1.0, 5.0).with_armor(1, 1),
        EquipmentEntry::new("Heavy Shield", Shield, 2.0, 15.0).with_armor(2, 2),
        EquipmentEntry::new("Backpack", GeneralItem, 1.0, 2.0),
        EquipmentEntry::new("Bedroll", GeneralItem, 1.0, 1.0),
        EquipmentEntry::new("Rope", GeneralItem, 1.0, 1.0),
        EquipmentEntry::new("Torch", GeneralItem, 1.0, 0.1),
        EquipmentEntry::new("Holy Symbol", GeneralItem, 1.0, 5.0),
        EquipmentEntry::new("Spellbook", GeneralItem, 1.0, 15.0),
        EquipmentEntry::new("Thieves' Tools", GeneralItem, 1.0, 30.0),
        EquipmentEntry::new("Healer's Kit", GeneralItem, 1.0, 10.0),
        EquipmentEntry::new("Alchemist's Fire", Alchemical, 0.5, 10.0),
        EquipmentEntry::new("Healing Potion", Alchemical, 0.5, 25.0),
        EquipmentEntry::new("Travel Rations", Food, 0.5, 0.5),
        EquipmentEntry::new("Traveler's Clothes", Clothing, 1.0, 5.0),
        EquipmentEntry::new("Riding Horse", Animal, 0.0, 75.0),
    ]
}
