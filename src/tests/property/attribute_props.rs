//! Property-based tests for attribute allocation
//!
//! Tests invariants:
//! - Point-buy cost rises with every step
//! - Point-buy never overspends the budget
//! - An "any" racial slot lands on at most one attribute
//! - Rolled pools stay in range

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::character_gen::attributes::{
    point_cost, roll_pool, roll_to_modifier, Attribute, AttributeAllocation, RacialModifier,
    MAX_BASE, MIN_BASE, POINT_BUY_BUDGET, ROLLED_POOL_SIZE,
};

// ============================================================================
// Strategies for generating test inputs
// ============================================================================

fn arb_attribute() -> impl Strategy<Value = Attribute> {
    prop::sample::select(Attribute::ALL.to_vec())
}

/// Increment (`true`) or decrement (`false`) one attribute
fn arb_point_buy_ops() -> impl Strategy<Value = Vec<(Attribute, bool)>> {
    prop::collection::vec((arb_attribute(), any::<bool>()), 0..60)
}

/// A race with three "any" slots around two fixed modifiers
fn flexible_modifiers() -> Vec<RacialModifier> {
    vec![
        RacialModifier::any(1),
        RacialModifier::fixed(Attribute::Strength, 2),
        RacialModifier::any(1),
        RacialModifier::fixed(Attribute::Wisdom, -1),
        RacialModifier::any(1),
    ]
}

fn arb_slot_ops() -> impl Strategy<Value = Vec<(usize, Option<Attribute>)>> {
    prop::collection::vec((0usize..6, prop::option::of(arb_attribute())), 0..30)
}

fn apply_point_buy(ops: &[(Attribute, bool)]) -> AttributeAllocation {
    ops.iter().fold(AttributeAllocation::new(), |a, &(attribute, up)| {
        if up {
            a.increment(attribute)
        } else {
            a.decrement(attribute)
        }
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: Each point-buy step costs at least one point
    #[test]
    fn prop_point_cost_strictly_increasing(value in MIN_BASE..MAX_BASE) {
        prop_assert!(point_cost(value + 1) > point_cost(value));
    }

    /// Property: Spent points never exceed the budget
    #[test]
    fn prop_point_buy_within_budget(ops in arb_point_buy_ops()) {
        let allocation = apply_point_buy(&ops);

        prop_assert!(allocation.spent() <= POINT_BUY_BUDGET);
        prop_assert!(allocation.remaining() >= 0);
        for attribute in Attribute::ALL {
            let base = allocation.base(attribute);
            prop_assert!((MIN_BASE..=MAX_BASE).contains(&base), "{} base {}", attribute, base);
        }
    }

    /// Property: A successful increment is undone by a decrement
    #[test]
    fn prop_increment_then_decrement(ops in arb_point_buy_ops(), attribute in arb_attribute()) {
        let allocation = apply_point_buy(&ops);
        prop_assume!(allocation.can_increment(attribute));

        let back = allocation.increment(attribute).decrement(attribute);
        prop_assert_eq!(back.base(attribute), allocation.base(attribute));
        prop_assert_eq!(back.spent(), allocation.spent());
    }

    /// Property: "Any" slots never stack on one attribute
    #[test]
    fn prop_any_slot_counted_once(ops in arb_slot_ops()) {
        let modifiers = flexible_modifiers();
        let allocation = ops.iter().fold(AttributeAllocation::new(), |a, &(slot, attribute)| {
            a.assign_slot(slot, attribute, &modifiers)
        });

        for slot in allocation.slot_assignments.keys() {
            prop_assert!(modifiers[*slot].is_any());
        }

        let mut targets: Vec<Attribute> = allocation.slot_assignments.values().copied().collect();
        let assigned = targets.len();
        targets.sort();
        targets.dedup();
        prop_assert_eq!(targets.len(), assigned);

        // Fixed modifiers contribute +2 - 1 whatever the slots do
        let flexible: i32 = Attribute::ALL
            .iter()
            .map(|&a| i32::from(allocation.racial_bonus(a, &modifiers)))
            .sum::<i32>()
            - 1;
        prop_assert_eq!(flexible, assigned as i32);
    }

    /// Property: Clearing slots leaves point-buy choices alone
    #[test]
    fn prop_clear_slots_keeps_base(ops in arb_point_buy_ops(), slots in arb_slot_ops()) {
        let modifiers = flexible_modifiers();
        let allocation = slots.iter().fold(apply_point_buy(&ops), |a, &(slot, attribute)| {
            a.assign_slot(slot, attribute, &modifiers)
        });

        let cleared = allocation.clear_slots();
        prop_assert!(cleared.slot_assignments.is_empty());
        prop_assert_eq!(cleared.base, allocation.base);
    }

    /// Property: Rolled pools hold six in-range values and are seed-stable
    #[test]
    fn prop_rolled_pool_in_range(seed in any::<u64>()) {
        let pool = roll_pool(&mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(pool.len(), ROLLED_POOL_SIZE);
        for value in &pool {
            prop_assert!((MIN_BASE..=MAX_BASE).contains(value));
        }
        prop_assert_eq!(pool, roll_pool(&mut StdRng::seed_from_u64(seed)));
    }

    /// Property: Higher dice totals never give a lower modifier
    #[test]
    fn prop_roll_modifier_monotonic(total in 3u32..18) {
        prop_assert!(roll_to_modifier(total + 1) >= roll_to_modifier(total));
    }
}
