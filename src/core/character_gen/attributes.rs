//! Attribute Engine
//!
//! Point-buy costs, rolled attribute pools and the racial modifier overlay.
//!
//! Base values are the game modifiers themselves and always sit in
//! `[MIN_BASE, MAX_BASE]`. Every mutation returns a new [`AttributeAllocation`];
//! a mutation the rules do not allow returns an unchanged copy.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Points available under point-buy.
pub const POINT_BUY_BUDGET: i32 = 10;
/// Lowest base value an attribute can hold.
pub const MIN_BASE: i8 = -1;
/// Highest base value an attribute can hold.
pub const MAX_BASE: i8 = 4;
/// Number of values in a rolled pool (one per attribute).
pub const ROLLED_POOL_SIZE: usize = 6;

// ============================================================================
// Attribute
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Strength,
        Attribute::Dexterity,
        Attribute::Constitution,
        Attribute::Intelligence,
        Attribute::Wisdom,
        Attribute::Charisma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Strength => "strength",
            Attribute::Dexterity => "dexterity",
            Attribute::Constitution => "constitution",
            Attribute::Intelligence => "intelligence",
            Attribute::Wisdom => "wisdom",
            Attribute::Charisma => "charisma",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Dexterity => "DEX",
            Attribute::Constitution => "CON",
            Attribute::Intelligence => "INT",
            Attribute::Wisdom => "WIS",
            Attribute::Charisma => "CHA",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Costs and Rolls
// ============================================================================

/// Point-buy cost of holding `value` as a base attribute.
///
/// The table is intentionally asymmetric: -1 refunds a point, 3 and 4 are
/// expensive. Values outside `[-1, 4]` cost the same as the nearest bound.
pub fn point_cost(value: i8) -> i32 {
    match value.clamp(MIN_BASE, MAX_BASE) {
        -1 => -1,
        0 => 0,
        1 => 1,
        2 => 2,
        3 => 4,
        _ => 7,
    }
}

/// Convert a 3-18 dice total into a base value.
pub fn roll_to_modifier(total: u32) -> i8 {
    let modifier = match total {
        0..=7 => -2,
        8..=9 => -1,
        10..=11 => 0,
        12..=13 => 1,
        14..=15 => 2,
        16..=17 => 3,
        _ => 4,
    };
    modifier.clamp(MIN_BASE, MAX_BASE)
}

/// Roll a pool of six base values, each 4d6 drop lowest.
pub fn roll_pool(rng: &mut impl Rng) -> Vec<i8> {
    (0..ROLLED_POOL_SIZE)
        .map(|_| {
            let mut rolls: Vec<u32> = (0..4).map(|_| rng.gen_range(1..=6)).collect();
            rolls.sort_unstable();
            roll_to_modifier(rolls[1..].iter().sum())
        })
        .collect()
}

// ============================================================================
// Racial Modifiers
// ============================================================================

/// What a racial modifier applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierTarget {
    /// Bound to one attribute by the race definition
    Attribute(Attribute),
    /// Free slot, resolved by the player
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RacialModifier {
    pub target: ModifierTarget,
    pub value: i8,
}

impl RacialModifier {
    pub fn fixed(attribute: Attribute, value: i8) -> Self {
        Self {
            target: ModifierTarget::Attribute(attribute),
            value,
        }
    }

    pub fn any(value: i8) -> Self {
        Self {
            target: ModifierTarget::Any,
            value,
        }
    }

    pub fn is_any(&self) -> bool {
        self.target == ModifierTarget::Any
    }
}

/// Resolved value of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeScore {
    pub base: i8,
    pub racial_bonus: i8,
    pub total: i8,
}

// ============================================================================
// Attribute Allocation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    #[default]
    PointBuy,
    Rolled,
}

/// The player's attribute choices.
///
/// `slot_assignments` is keyed by the index of an "any" modifier in the race's
/// modifier list, so a slot can only ever point at one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeAllocation {
    pub mode: GenerationMode,
    /// Point-buy base values; a missing attribute is 0
    pub base: BTreeMap<Attribute, i8>,
    /// Rolled values available in rolled mode
    #[serde(deserialize_with = "deserialize_rolled_pool")]
    pub rolled_pool: Vec<i8>,
    /// Attribute -> index into `rolled_pool`
    pub rolled_assignments: BTreeMap<Attribute, usize>,
    /// "Any" modifier slot -> chosen attribute
    pub slot_assignments: BTreeMap<usize, Attribute>,
}

impl AttributeAllocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base value of an attribute under the current generation mode.
    pub fn base(&self, attribute: Attribute) -> i8 {
        match self.mode {
            GenerationMode::PointBuy => self
                .base
                .get(&attribute)
                .copied()
                .unwrap_or(0)
                .clamp(MIN_BASE, MAX_BASE),
            GenerationMode::Rolled => self
                .rolled_assignments
                .get(&attribute)
                .and_then(|&index| self.rolled_pool.get(index))
                .copied()
                .unwrap_or(0)
                .clamp(MIN_BASE, MAX_BASE),
        }
    }

    /// Points spent under point-buy. Rolled allocations spend nothing.
    pub fn spent(&self) -> i32 {
        match self.mode {
            GenerationMode::PointBuy => Attribute::ALL.iter().map(|&a| point_cost(self.base(a))).sum(),
            GenerationMode::Rolled => 0,
        }
    }

    pub fn remaining(&self) -> i32 {
        POINT_BUY_BUDGET - self.spent()
    }

    /// Whether `increment(attribute)` would change anything.
    pub fn can_increment(&self, attribute: Attribute) -> bool {
        if self.mode != GenerationMode::PointBuy {
            return false;
        }
        let current = self.base(attribute);
        if current >= MAX_BASE {
            return false;
        }
        point_cost(current + 1) - point_cost(current) <= self.remaining()
    }

    pub fn can_decrement(&self, attribute: Attribute) -> bool {
        self.mode == GenerationMode::PointBuy && self.base(attribute) > MIN_BASE
    }

    pub fn increment(&self, attribute: Attribute) -> Self {
        let mut next = self.clone();
        if self.can_increment(attribute) {
            next.base.insert(attribute, self.base(attribute) + 1);
        }
        next
    }

    pub fn decrement(&self, attribute: Attribute) -> Self {
        let mut next = self.clone();
        if self.can_decrement(attribute) {
            next.base.insert(attribute, self.base(attribute) - 1);
        }
        next
    }

    /// Switch generation mode. Changing mode starts the allocation over but
    /// keeps "any" slot assignments, which belong to the race.
    pub fn with_mode(&self, mode: GenerationMode) -> Self {
        if self.mode == mode {
            return self.clone();
        }
        Self {
            mode,
            slot_assignments: self.slot_assignments.clone(),
            ..Self::default()
        }
    }

    /// Replace the rolled pool and enter rolled mode.
    pub fn with_rolled_pool(&self, pool: Vec<i8>) -> Self {
        Self {
            mode: GenerationMode::Rolled,
            rolled_pool: pool
                .into_iter()
                .take(ROLLED_POOL_SIZE)
                .map(|v| v.clamp(MIN_BASE, MAX_BASE))
                .collect(),
            slot_assignments: self.slot_assignments.clone(),
            ..Self::default()
        }
    }

    /// Assign a rolled value to an attribute, or free it with `None`.
    ///
    /// A pool index already held by another attribute cannot be taken.
    pub fn assign_roll(&self, attribute: Attribute, index: Option<usize>) -> Self {
        let mut next = self.clone();
        if self.mode != GenerationMode::Rolled {
            return next;
        }
        match index {
            None => {
                next.rolled_assignments.remove(&attribute);
            }
            Some(index) => {
                let taken = self
                    .rolled_assignments
                    .iter()
                    .any(|(&other, &i)| other != attribute && i == index);
                if index < self.rolled_pool.len() && !taken {
                    next.rolled_assignments.insert(attribute, index);
                }
            }
        }
        next
    }

    /// Every attribute has a value. Always true under point-buy.
    pub fn is_fully_assigned(&self) -> bool {
        match self.mode {
            GenerationMode::PointBuy => true,
            GenerationMode::Rolled => {
                self.rolled_pool.len() == ROLLED_POOL_SIZE
                    && Attribute::ALL.iter().all(|a| self.rolled_assignments.contains_key(a))
            }
        }
    }

    /// Point an "any" modifier slot at an attribute, or free it with `None`.
    ///
    /// The slot must be an "any" modifier of `modifiers`, and two slots may not
    /// share an attribute.
    pub fn assign_slot(
        &self,
        slot: usize,
        attribute: Option<Attribute>,
        modifiers: &[RacialModifier],
    ) -> Self {
        let mut next = self.clone();
        if !modifiers.get(slot).is_some_and(RacialModifier::is_any) {
            return next;
        }
        match attribute {
            None => {
                next.slot_assignments.remove(&slot);
            }
            Some(attribute) => {
                let held_elsewhere = self
                    .slot_assignments
                    .iter()
                    .any(|(&other, &a)| other != slot && a == attribute);
                if !held_elsewhere {
                    next.slot_assignments.insert(slot, attribute);
                }
            }
        }
        next
    }

    pub fn clear_slots(&self) -> Self {
        Self {
            slot_assignments: BTreeMap::new(),
            ..self.clone()
        }
    }

    /// Sum of racial modifiers landing on `attribute`.
    pub fn racial_bonus(&self, attribute: Attribute, modifiers: &[RacialModifier]) -> i8 {
        modifiers
            .iter()
            .enumerate()
            .filter(|(slot, m)| match m.target {
                ModifierTarget::Attribute(a) => a == attribute,
                ModifierTarget::Any => self.slot_assignments.get(slot) == Some(&attribute),
            })
            .fold(0i8, |sum, (_, m)| sum.saturating_add(m.value))
    }

    pub fn total(&self, attribute: Attribute, modifiers: &[RacialModifier]) -> i8 {
        self.base(attribute)
            .saturating_add(self.racial_bonus(attribute, modifiers))
    }

    pub fn score(&self, attribute: Attribute, modifiers: &[RacialModifier]) -> AttributeScore {
        let base = self.base(attribute);
        let racial_bonus = self.racial_bonus(attribute, modifiers);
        AttributeScore {
            base,
            racial_bonus,
            total: base.saturating_add(racial_bonus),
        }
    }

    pub fn scores(&self, modifiers: &[RacialModifier]) -> BTreeMap<Attribute, AttributeScore> {
        Attribute::ALL
            .iter()
            .map(|&a| (a, self.score(a, modifiers)))
            .collect()
    }
}

/// Stored pools are trimmed to size and clamped into the base range.
fn deserialize_rolled_pool<'de, D>(deserializer: D) -> Result<Vec<i8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let pool = Vec::<i8>::deserialize(deserializer)?;
    Ok(pool
        .into_iter()
        .take(ROLLED_POOL_SIZE)
        .map(|v| v.clamp(MIN_BASE, MAX_BASE))
        .collect())
}
