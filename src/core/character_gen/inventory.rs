//! Inventory Ledger
//!
//! The character's bag: equipment entries grouped by a closed set of
//! categories, with carried space and armor penalty recomputed after every
//! mutation.
//!
//! A [`BagLedger`] is never mutated in place. Every operation returns a new
//! ledger, so a draft bag and a confirmed bag cannot alias each other.
//!
//! # Plain data
//!
//! Persisted bags are plain `group -> [entry, ...]` maps. [`BagLedger::to_plain_data`]
//! and [`BagLedger::from_plain_data`] are the only conversions between the two
//! shapes, and serde goes through them. Loading never fails: unknown groups fold
//! into [`EquipmentGroup::GeneralItem`] and malformed entries are dropped.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Equipment Group
// ============================================================================

/// Equipment categories. Anything outside this set is a general item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EquipmentGroup {
    Weapon,
    Armor,
    Shield,
    #[default]
    GeneralItem,
    Alchemical,
    Clothing,
    Food,
    Animal,
    Vehicle,
    Service,
}

impl EquipmentGroup {
    pub const ALL: [EquipmentGroup; 10] = [
        EquipmentGroup::Weapon,
        EquipmentGroup::Armor,
        EquipmentGroup::Shield,
        EquipmentGroup::GeneralItem,
        EquipmentGroup::Alchemical,
        EquipmentGroup::Clothing,
        EquipmentGroup::Food,
        EquipmentGroup::Animal,
        EquipmentGroup::Vehicle,
        EquipmentGroup::Service,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentGroup::Weapon => "weapon",
            EquipmentGroup::Armor => "armor",
            EquipmentGroup::Shield => "shield",
            EquipmentGroup::GeneralItem => "general_item",
            EquipmentGroup::Alchemical => "alchemical",
            EquipmentGroup::Clothing => "clothing",
            EquipmentGroup::Food => "food",
            EquipmentGroup::Animal => "animal",
            EquipmentGroup::Vehicle => "vehicle",
            EquipmentGroup::Service => "service",
        }
    }

    /// Map a free-form group label onto the closed set.
    pub fn normalize(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match key.as_str() {
            "weapon" | "weapons" => EquipmentGroup::Weapon,
            "armor" | "armour" | "armors" => EquipmentGroup::Armor,
            "shield" | "shields" => EquipmentGroup::Shield,
            "alchemical" | "alchemy" => EquipmentGroup::Alchemical,
            "clothing" | "clothes" => EquipmentGroup::Clothing,
            "food" | "foods" => EquipmentGroup::Food,
            "animal" | "animals" | "mount" => EquipmentGroup::Animal,
            "vehicle" | "vehicles" => EquipmentGroup::Vehicle,
            "service" | "services" => EquipmentGroup::Service,
            _ => EquipmentGroup::GeneralItem,
        }
    }

    /// Only armor and shields contribute to the armor penalty.
    pub fn counts_toward_armor(&self) -> bool {
        matches!(self, EquipmentGroup::Armor | EquipmentGroup::Shield)
    }
}

impl From<String> for EquipmentGroup {
    fn from(raw: String) -> Self {
        Self::normalize(&raw)
    }
}

impl From<EquipmentGroup> for String {
    fn from(group: EquipmentGroup) -> Self {
        group.as_str().to_string()
    }
}

impl fmt::Display for EquipmentGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Equipment Entry
// ============================================================================

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    pub name: String,
    #[serde(default)]
    pub group: EquipmentGroup,
    /// Space taken by one unit
    #[serde(default)]
    pub space: f64,
    /// Price of one unit
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub armor_penalty: i32,
    #[serde(default)]
    pub defense_bonus: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EquipmentEntry {
    pub fn new(name: impl Into<String>, group: EquipmentGroup, space: f64, price: f64) -> Self {
        Self {
            name: name.into(),
            group,
            space,
            price,
            quantity: 1,
            armor_penalty: 0,
            defense_bonus: 0,
            description: None,
        }
    }

    /// Generic stand-in for equipment the catalog does not know.
    pub fn placeholder(name: impl Into<String>, space: f64) -> Self {
        Self::new(name, EquipmentGroup::GeneralItem, space, 0.0)
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_armor(mut self, defense_bonus: i32, armor_penalty: i32) -> Self {
        self.defense_bonus = defense_bonus;
        self.armor_penalty = armor_penalty;
        self
    }

    pub fn total_space(&self) -> f64 {
        self.space * f64::from(self.quantity)
    }

    pub fn total_price(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Equipment as referenced by catalogs: a bare name or a full entry.
///
/// Names are resolved against the equipment catalog before entering a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EquipmentRef {
    ByName(String),
    Full(EquipmentEntry),
}

impl EquipmentRef {
    pub fn name(&self) -> &str {
        match self {
            EquipmentRef::ByName(name) => name,
            EquipmentRef::Full(entry) => &entry.name,
        }
    }
}

impl From<&str> for EquipmentRef {
    fn from(name: &str) -> Self {
        EquipmentRef::ByName(name.to_string())
    }
}

// ============================================================================
// Bag Ledger
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BagLedger {
    groups: IndexMap<EquipmentGroup, Vec<EquipmentEntry>>,
    spaces: f64,
    armor_penalty: i32,
}

impl BagLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `items` to `group`. An item already present (same name, same group)
    /// gains the incoming quantity; a new item starts at its own quantity, or 1.
    pub fn add_equipment(&self, group: EquipmentGroup, items: &[EquipmentEntry]) -> Self {
        let mut next = self.clone();
        for item in items {
            let quantity = item.quantity.max(1);
            let entries = next.groups.entry(group).or_default();
            match entries.iter_mut().find(|e| e.name == item.name) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
                None => entries.push(EquipmentEntry {
                    group,
                    quantity,
                    ..item.clone()
                }),
            }
        }
        next.recompute()
    }

    /// Add each item to its own group.
    pub fn add_items(&self, items: &[EquipmentEntry]) -> Self {
        items.iter().fold(self.clone(), |bag, item| {
            bag.add_equipment(item.group, std::slice::from_ref(item))
        })
    }

    /// Add every entry of `other`.
    pub fn merge(&self, other: &BagLedger) -> Self {
        other
            .groups
            .iter()
            .fold(self.clone(), |bag, (&group, entries)| bag.add_equipment(group, entries))
    }

    /// Take one unit of `name` out of `group`, deleting the entry at zero.
    pub fn remove_equipment(&self, group: EquipmentGroup, name: &str) -> Self {
        let mut next = self.clone();
        if let Some(entries) = next.groups.get_mut(&group) {
            if let Some(pos) = entries.iter().position(|e| e.name == name) {
                if entries[pos].quantity > 1 {
                    entries[pos].quantity -= 1;
                } else {
                    entries.remove(pos);
                }
            }
            if entries.is_empty() {
                next.groups.shift_remove(&group);
            }
        }
        next.recompute()
    }

    /// Total carried space across every group.
    pub fn spaces(&self) -> f64 {
        self.spaces
    }

    /// Armor penalty from the armor and shield groups only.
    pub fn armor_penalty(&self) -> i32 {
        self.armor_penalty
    }

    /// Defense granted by worn armor and shields.
    pub fn defense_bonus(&self) -> i32 {
        self.entries()
            .filter(|e| e.group.counts_toward_armor())
            .fold(0i32, |sum, e| sum.saturating_add(e.defense_bonus))
    }

    pub fn total_price(&self) -> f64 {
        self.entries().map(EquipmentEntry::total_price).sum()
    }

    pub fn group(&self, group: EquipmentGroup) -> &[EquipmentEntry] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn groups(&self) -> impl Iterator<Item = (EquipmentGroup, &[EquipmentEntry])> {
        self.groups.iter().map(|(&g, entries)| (g, entries.as_slice()))
    }

    pub fn entries(&self) -> impl Iterator<Item = &EquipmentEntry> {
        self.groups.values().flatten()
    }

    pub fn quantity_of(&self, group: EquipmentGroup, name: &str) -> u32 {
        self.group(group)
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.values().all(Vec::is_empty)
    }

    /// Number of distinct entries.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    fn recompute(mut self) -> Self {
        self.spaces = self.entries().map(EquipmentEntry::total_space).sum();
        self.armor_penalty = self
            .entries()
            .filter(|e| e.group.counts_toward_armor())
            .fold(0i32, |sum, e| {
                let quantity = i32::try_from(e.quantity).unwrap_or(i32::MAX);
                sum.saturating_add(e.armor_penalty.saturating_mul(quantity))
            });
        self
    }

    // ========================================================================
    // Plain data boundary
    // ========================================================================

    /// Serialize to a plain `group -> [entry, ...]` map.
    pub fn to_plain_data(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .groups
            .iter()
            .map(|(group, entries)| {
                let entries = entries
                    .iter()
                    .filter_map(|e| serde_json::to_value(e).ok())
                    .collect();
                (group.as_str().to_string(), serde_json::Value::Array(entries))
            })
            .collect();
        serde_json::Value::Object(map)
    }

    /// Rebuild a ledger from plain data, dropping whatever does not fit.
    pub fn from_plain_data(value: &serde_json::Value) -> Self {
        let Some(map) = value.as_object() else {
            if !value.is_null() {
                tracing::warn!("Bag data is not a map, using an empty bag");
            }
            return Self::default();
        };

        let mut bag = Self::default();
        for (raw_group, entries) in map {
            let group = EquipmentGroup::normalize(raw_group);
            let Some(entries) = entries.as_array() else {
                tracing::warn!(group = %raw_group, "Bag group is not a list, skipping");
                continue;
            };
            let parsed: Vec<EquipmentEntry> = entries
                .iter()
                .filter_map(|raw| match serde_json::from_value::<EquipmentEntry>(raw.clone()) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::warn!(group = %raw_group, error = %e, "Dropping malformed bag entry");
                        None
                    }
                })
                .collect();
            bag = bag.add_equipment(group, &parsed);
        }
        bag
    }
}

impl Serialize for BagLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_plain_data().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BagLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_plain_data(&value))
    }
}
