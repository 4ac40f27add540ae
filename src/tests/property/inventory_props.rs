//! Property-based tests for the bag ledger
//!
//! Tests invariants:
//! - Adding an item already in the bag stacks its quantity
//! - Carried space is the sum of entry spaces
//! - Armor penalty only counts armor and shields
//! - Adding then returning every unit restores the bag

use proptest::prelude::*;

use crate::core::character_gen::inventory::{BagLedger, EquipmentEntry, EquipmentGroup};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_group() -> impl Strategy<Value = EquipmentGroup> {
    prop::sample::select(EquipmentGroup::ALL.to_vec())
}

/// Halves keep float sums exact
fn arb_halves() -> impl Strategy<Value = f64> {
    (0u32..20).prop_map(|n| f64::from(n) * 0.5)
}

fn arb_entry() -> impl Strategy<Value = EquipmentEntry> {
    (arb_group(), arb_halves(), arb_halves(), 1u32..5, 0i32..4).prop_map(
        |(group, space, price, quantity, penalty)| {
            EquipmentEntry::new("item", group, space, price)
                .with_quantity(quantity)
                .with_armor(0, penalty)
        },
    )
}

/// Entries with distinct names
fn arb_entries() -> impl Strategy<Value = Vec<EquipmentEntry>> {
    prop::collection::vec(arb_entry(), 0..12).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| EquipmentEntry {
                name: format!("item-{i}"),
                ..entry
            })
            .collect()
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: The same item added twice is one entry with both quantities
    #[test]
    fn prop_same_item_stacks(entry in arb_entry(), group in arb_group()) {
        let bag = BagLedger::new()
            .add_equipment(group, std::slice::from_ref(&entry))
            .add_equipment(group, std::slice::from_ref(&entry));

        prop_assert_eq!(bag.len(), 1);
        prop_assert_eq!(bag.quantity_of(group, &entry.name), entry.quantity * 2);
    }

    /// Property: Space is the sum of space times quantity
    #[test]
    fn prop_spaces_are_linear(entries in arb_entries()) {
        let bag = BagLedger::new().add_items(&entries);
        let expected: f64 = entries.iter().map(EquipmentEntry::total_space).sum();

        prop_assert_eq!(bag.len(), entries.len());
        prop_assert!((bag.spaces() - expected).abs() < 1e-9);
        prop_assert!((bag.total_price() - entries.iter().map(EquipmentEntry::total_price).sum::<f64>()).abs() < 1e-9);
    }

    /// Property: Only armor and shields carry a penalty
    #[test]
    fn prop_armor_penalty_from_armor_groups(entries in arb_entries()) {
        let bag = BagLedger::new().add_items(&entries);
        let expected: i32 = entries
            .iter()
            .filter(|e| e.group.counts_toward_armor())
            .map(|e| e.armor_penalty * e.quantity as i32)
            .sum();

        prop_assert_eq!(bag.armor_penalty(), expected);
    }

    /// Property: Returning every unit of a new item gives the old bag back
    #[test]
    fn prop_add_then_return_restores(entries in arb_entries(), extra in arb_entry()) {
        let bag = BagLedger::new().add_items(&entries);
        let extra = EquipmentEntry {
            name: "extra".to_string(),
            ..extra
        };

        let mut changed = bag.add_items(std::slice::from_ref(&extra));
        prop_assert_eq!(changed.quantity_of(extra.group, "extra"), extra.quantity);
        for _ in 0..extra.quantity {
            changed = changed.remove_equipment(extra.group, "extra");
        }

        prop_assert_eq!(changed, bag);
    }

    /// Property: Returning something never carried changes nothing
    #[test]
    fn prop_return_unknown_is_noop(entries in arb_entries(), group in arb_group()) {
        let bag = BagLedger::new().add_items(&entries);
        prop_assert_eq!(bag.remove_equipment(group, "never-bought"), bag);
    }
}
