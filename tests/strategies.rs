#![allow(dead_code)]


pub use fixtures::*;

use predicate_builder::{And, AnyPredicate, Comparison, Not, Or, TypedPredicate};
use proptest::prelude::*;

// --- Value pools ---
// Names and tags are drawn from small pools so that generated predicates
// match generated records often enough to be interesting.

pub const NAMES: &[&str] = &["X-Wing", "TIE fighter", "Death Star", "Tardis"];
pub const TAGS: &[&str] = &["fast", "armed", "shielded"];
const PREFIXES: &[&str] = &["x", "TIE", "death", "t"];

/// A plain comparison on a scalar field of `Spaceship`.
pub fn arb_comparison() -> impl Strategy<Value = Comparison<Spaceship>> {
    prop_oneof![
        (prop::sample::select(NAMES), any::<bool>()).prop_map(|(name, is_eq)| {
            if is_eq {
                Spaceship::NAME.eq(name)
            } else {
                Spaceship::NAME.neq(name)
            }
        }),
        (0_i32..=300_000, 0_u8..6).prop_map(|(cost, op)| match op {
            0 => Spaceship::COST.eq(cost),
            1 => Spaceship::COST.neq(cost),
            2 => Spaceship::COST.gt(cost),
            3 => Spaceship::COST.gte(cost),
            4 => Spaceship::COST.lt(cost),
            _ => Spaceship::COST.lte(cost),
        }),
        any::<bool>().prop_map(|value| Spaceship::IS_REAL.eq(value)),
        any::<bool>().prop_map(|nil| {
            if nil {
                Spaceship::DESCRIPTION.is_nil()
            } else {
                Spaceship::DESCRIPTION.is_not_nil()
            }
        }),
        (prop::sample::select(PREFIXES), any::<bool>()).prop_map(|(prefix, fold)| {
            let cmp = Spaceship::NAME.begins_with(prefix);
            if fold {
                cmp.case_insensitive()
            } else {
                cmp
            }
        }),
        (0_i32..=150_000, 0_i32..=150_000)
            .prop_map(|(a, b)| Spaceship::COST.between(a.min(b)..=a.max(b))),
    ]
}

/// Any leaf node: a comparison or a quantifier over a relationship.
pub fn arb_leaf() -> impl Strategy<Value = AnyPredicate<Spaceship>> {
    prop_oneof![
        4 => arb_comparison().prop_map(|cmp| cmp.erase()),
        1 => (prop::sample::select(NAMES), any::<bool>()).prop_map(|(name, none)| {
            let inner = Spaceship::NAME.eq(name);
            if none {
                Spaceship::FLEET_MEMBERS.none(inner).erase()
            } else {
                Spaceship::FLEET_MEMBERS.any(inner).erase()
            }
        }),
        1 => (0_i32..=300_000).prop_map(|cost| Spaceship::ENEMIES.any(Spaceship::COST.gt(cost)).erase()),
        1 => prop::sample::select(TAGS).prop_map(|tag| Spaceship::TAGS.any(Tag::SELF.eq(tag)).erase()),
    ]
}

/// A predicate tree up to three levels of AND / OR / NOT deep. Combinators
/// may be empty.
pub fn arb_predicate() -> impl Strategy<Value = AnyPredicate<Spaceship>> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|members| And::from_members(members).erase()),
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|members| Or::from_members(members).erase()),
            inner.prop_map(|member| Not::single(member).erase()),
        ]
    })
}

fn arb_captain() -> impl Strategy<Value = Option<Person>> {
    prop::option::of((prop::sample::select(NAMES), 0_i64..1_000).prop_map(|(name, age)| Person {
        name: name.to_owned(),
        age,
    }))
}

fn arb_plain_ship() -> impl Strategy<Value = Spaceship> {
    (
        prop::sample::select(NAMES),
        prop::option::of(prop::sample::select(NAMES)),
        0_i32..=300_000,
        any::<bool>(),
        prop::collection::vec(prop::sample::select(TAGS), 0..3),
        arb_captain(),
    )
        .prop_map(|(name, description, cost, is_real, tags, captain)| Spaceship {
            name: name.to_owned(),
            description: description.map(|d| format!("{d} log")),
            cost,
            is_real,
            fleet_members: None,
            enemies: Vec::new(),
            tags: tags.into_iter().map(str::to_owned).collect(),
            captain,
        })
}

/// A ship with optional fleet members and enemies one level deep.
pub fn arb_ship() -> impl Strategy<Value = Spaceship> {
    (
        arb_plain_ship(),
        prop::option::of(prop::collection::vec(arb_plain_ship(), 0..3)),
        prop::collection::vec(arb_plain_ship(), 0..3),
    )
        .prop_map(|(mut ship, fleet, enemies)| {
            ship.fleet_members = fleet;
            ship.enemies = enemies;
            ship
        })
}
