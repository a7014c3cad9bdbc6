//! Property-Based Tests for PETZ Core
//!
//! Uses `proptest` to check the pet invariants under random action/time
//! sequences and random (often hostile) save contents.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

use petz_core::actions::{self, ActionKind};
use petz_core::config::RulesConfig;
use petz_core::lifecycle;
use petz_core::persistence::adapter;
use petz_core::persistence::{MemoryStore, SnapshotAdapter};
use petz_core::types::{sanitize_name, PetState, Timestamp, LEVEL_CAP, MAX_NAME_LENGTH, MAX_STAT};
use petz_core::view::bar_percent;

const T0: Timestamp = Timestamp(1_700_000_000_000);

const SNAPSHOT_KEYS: [&str; 15] = [
    "name",
    "hunger",
    "sleepiness",
    "enrichment",
    "bonding",
    "level",
    "alive",
    "lastTick",
    "hungerMaxTimestamp",
    "sleepinessMaxTimestamp",
    "overloadStart",
    "deathNote",
    "deathSnarkLine",
    "reviveLevel",
    "createdAt",
];

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Step {
    Act(ActionKind),
    WaitMinutes(i64),
    Revive,
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (0..ActionKind::ALL.len()).prop_map(|i| Step::Act(ActionKind::ALL[i])),
        4 => (0i64..3 * 24 * 60).prop_map(Step::WaitMinutes),
        1 => Just(Step::Revive),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        (-1.0e15..1.0e15f64).prop_map(|n| json!(n)),
        (-5i32..40).prop_map(|n| Value::String(n.to_string())),
        ".{0,30}".prop_map(Value::String),
        Just(json!([1, 2, 3])),
    ]
}

fn check_invariants(state: &PetState, now: Timestamp) -> Result<(), TestCaseError> {
    for stat in [state.hunger, state.sleepiness, state.enrichment, state.bonding] {
        prop_assert!(stat <= MAX_STAT);
    }
    prop_assert!((1..=LEVEL_CAP).contains(&state.level));
    prop_assert!(state.last_tick <= now);

    if state.alive {
        prop_assert_eq!(state.hunger >= MAX_STAT, state.hunger_max_timestamp.is_some());
        prop_assert_eq!(
            state.sleepiness >= MAX_STAT,
            state.sleepiness_max_timestamp.is_some()
        );
        prop_assert_eq!(state.overload_start, lifecycle::overload_start(state));
        prop_assert!(state.revive_level.is_none());
    } else {
        prop_assert!(state.hunger_max_timestamp.is_none());
        prop_assert!(state.sleepiness_max_timestamp.is_none());
        prop_assert!(state.overload_start.is_none());
        prop_assert!(state.revive_level.is_some());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Property: bar fill is a percentage
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn bar_percent_in_range(value in any::<u8>()) {
        prop_assert!(bar_percent(value) <= 100);
    }
}

// ---------------------------------------------------------------------------
// Property: names are never empty and never too long
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn sanitized_names_fit(raw in ".{0,60}") {
        let name = sanitize_name(&raw);
        prop_assert!(!name.is_empty());
        prop_assert!(name.chars().count() <= MAX_NAME_LENGTH);
    }
}

// ---------------------------------------------------------------------------
// Property: random care and neglect keep every invariant
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn random_sessions_keep_invariants(
        steps in prop::collection::vec(arb_step(), 0..80),
        seed in any::<u64>(),
    ) {
        let rules = RulesConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = PetState::new("Pip", T0);
        let mut now = T0;

        for step in steps {
            match step {
                Step::Act(kind) => {
                    actions::apply_action(&mut state, kind, now, &rules, &mut rng);
                    if state.alive && state.level < LEVEL_CAP {
                        prop_assert!(!(state.enrichment == MAX_STAT && state.bonding == MAX_STAT));
                    }
                }
                Step::WaitMinutes(minutes) => {
                    now = now.plus_millis(minutes * 60_000);
                    lifecycle::tick(&mut state, now, &rules, &mut rng);
                }
                Step::Revive => {
                    lifecycle::revive(&mut state, now);
                }
            }
            check_invariants(&state, now)?;
        }
    }
}

// ---------------------------------------------------------------------------
// Property: ticking twice at the same instant changes nothing the second time
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn tick_is_idempotent(hunger in 0..=MAX_STAT, hours in 0i64..500, seed in any::<u64>()) {
        let rules = RulesConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = PetState::new("Pip", T0);
        state.hunger = hunger;
        if hunger == MAX_STAT {
            state.hunger_max_timestamp = Some(T0);
        }

        let now = T0.plus_hours(hours);
        lifecycle::tick(&mut state, now, &rules, &mut rng);
        let after_first = state.clone();

        let second = lifecycle::tick(&mut state, now, &rules, &mut rng);
        prop_assert!(!second.changed());
        prop_assert_eq!(state, after_first);
    }
}

// ---------------------------------------------------------------------------
// Property: any JSON object loads into a consistent state
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn arbitrary_snapshot_sanitizes(values in prop::collection::vec(prop::option::of(arb_json()), SNAPSHOT_KEYS.len())) {
        let mut fields = Map::new();
        for (key, value) in SNAPSHOT_KEYS.iter().zip(values) {
            if let Some(value) = value {
                fields.insert((*key).to_string(), value);
            }
        }

        let state = adapter::sanitize(&fields, T0);
        check_invariants(&state, T0)?;
        prop_assert!(state.created_at <= T0);
        for ts in [state.hunger_max_timestamp, state.sleepiness_max_timestamp, state.overload_start]
            .into_iter()
            .flatten()
        {
            prop_assert!(ts <= T0);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: save → load is lossless for reachable states
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn snapshot_round_trip(steps in prop::collection::vec(arb_step(), 0..40), seed in any::<u64>()) {
        let rules = RulesConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = PetState::new("Pip", T0);
        let mut now = T0;

        for step in steps {
            match step {
                Step::Act(kind) => {
                    actions::apply_action(&mut state, kind, now, &rules, &mut rng);
                }
                Step::WaitMinutes(minutes) => {
                    now = now.plus_millis(minutes * 60_000);
                    lifecycle::tick(&mut state, now, &rules, &mut rng);
                }
                Step::Revive => {
                    lifecycle::revive(&mut state, now);
                }
            }
        }

        let adapter = SnapshotAdapter::new(MemoryStore::new(), "petz-state-v1");
        prop_assert!(adapter.save(&state));
        let loaded = adapter.load(now);
        prop_assert!(!loaded.first_launch);
        prop_assert_eq!(loaded.state, state);
    }
}
