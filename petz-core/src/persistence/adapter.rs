//! Sanitising snapshot load/save.
//!
//! The snapshot is untrusted: it may be missing, truncated, hand-edited or
//! written by an older build. Every field is read on its own so one bad value
//! never costs the rest of the save, and the stat/timestamp invariants are
//! re-established before the state reaches the simulation.

use std::time::Instant;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::lifecycle;
use crate::types::{sanitize_name, PetState, Timestamp, LEVEL_CAP, MAX_STAT};

use super::Store;

/// Result of [`SnapshotAdapter::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// The sanitised (or fresh) state.
    pub state: PetState,
    /// No usable snapshot was found.
    pub first_launch: bool,
    /// The store answered; `false` means the pet lives in memory only.
    pub durable: bool,
}

/// Reads and writes the pet snapshot under one versioned key.
pub struct SnapshotAdapter {
    store: Box<dyn Store>,
    key: String,
}

impl std::fmt::Debug for SnapshotAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotAdapter")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SnapshotAdapter {
    /// Adapter over `store`, saving under `key`.
    pub fn new(store: impl Store + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
        }
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the snapshot, falling back to a fresh pet on any problem.
    #[must_use]
    pub fn load(&self, now: Timestamp) -> Loaded {
        let start = Instant::now();
        let fresh = |durable| Loaded {
            state: PetState::new("", now),
            first_launch: true,
            durable,
        };

        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => raw,
            Ok(_) => return fresh(true),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Store unavailable, pet will not be saved");
                return fresh(false);
            }
        };

        let fields = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                warn!(key = %self.key, kind = json_kind(&other), "Snapshot is not an object, discarding");
                return fresh(true);
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Corrupted snapshot, discarding");
                return fresh(true);
            }
        };

        let state = sanitize(&fields, now);
        debug!(
            key = %self.key,
            bytes = raw.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Loaded pet snapshot"
        );

        Loaded {
            state,
            first_launch: false,
            durable: true,
        }
    }

    /// Write the normalised projection of `state`. Returns whether the store
    /// accepted it.
    pub fn save(&self, state: &PetState) -> bool {
        let start = Instant::now();
        let mut projection = state.clone();
        normalize(&mut projection);
        let json = match serde_json::to_string(&projection) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Unable to encode pet snapshot");
                return false;
            }
        };

        match self.store.set(&self.key, &json) {
            Ok(()) => {
                debug!(
                    key = %self.key,
                    bytes = json.len(),
                    elapsed_us = start.elapsed().as_micros(),
                    "Saved pet snapshot"
                );
                true
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Unable to save pet state");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Field sanitising
// ---------------------------------------------------------------------------

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A number, or a string holding one.
fn numeric(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamped_u8(value: Option<&Value>, min: u8, max: u8, fallback: u8) -> u8 {
    numeric(value).map_or(fallback, |n| {
        n.round().clamp(f64::from(min), f64::from(max)) as u8
    })
}

/// Timestamps must be actual JSON numbers; a future one is pulled back to `now`.
#[allow(clippy::cast_possible_truncation)]
fn timestamp(value: Option<&Value>, now: Timestamp) -> Option<Timestamp> {
    let ms = value?.as_f64().filter(|n| n.is_finite())?;
    Some(Timestamp(ms.round() as i64).min(now))
}

fn string(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Rebuild a [`PetState`] from an untrusted JSON object.
#[must_use]
pub fn sanitize(fields: &Map<String, Value>, now: Timestamp) -> PetState {
    let base = PetState::new("", now);
    let get = |key: &str| fields.get(key);

    let mut state = PetState {
        name: get("name")
            .and_then(Value::as_str)
            .map_or_else(|| base.name.clone(), sanitize_name),
        hunger: clamped_u8(get("hunger"), 0, MAX_STAT, base.hunger),
        sleepiness: clamped_u8(get("sleepiness"), 0, MAX_STAT, base.sleepiness),
        enrichment: clamped_u8(get("enrichment"), 0, MAX_STAT, base.enrichment),
        bonding: clamped_u8(get("bonding"), 0, MAX_STAT, base.bonding),
        level: clamped_u8(get("level"), 1, LEVEL_CAP, base.level),
        alive: !matches!(get("alive"), Some(Value::Bool(false))),
        last_tick: timestamp(get("lastTick"), now).unwrap_or(base.last_tick),
        hunger_max_timestamp: timestamp(get("hungerMaxTimestamp"), now),
        sleepiness_max_timestamp: timestamp(get("sleepinessMaxTimestamp"), now),
        overload_start: timestamp(get("overloadStart"), now),
        death_note: string(get("deathNote")),
        death_snark_line: string(get("deathSnarkLine")),
        revive_level: numeric(get("reviveLevel"))
            .map(|_| clamped_u8(get("reviveLevel"), 1, LEVEL_CAP, 1)),
        created_at: timestamp(get("createdAt"), now).unwrap_or(base.created_at),
    };

    normalize(&mut state);
    state
}

/// Re-establish the stat/timestamp invariants on a loaded state.
pub fn normalize(state: &mut PetState) {
    if state.alive {
        for (value, max_ts) in [
            (state.hunger, &mut state.hunger_max_timestamp),
            (state.sleepiness, &mut state.sleepiness_max_timestamp),
        ] {
            if value >= MAX_STAT {
                max_ts.get_or_insert(state.last_tick);
            } else {
                *max_ts = None;
            }
        }
        state.overload_start = lifecycle::overload_start(state);
        state.revive_level = None;
        state.death_note.clear();
        state.death_snark_line.clear();
    } else {
        state.hunger_max_timestamp = None;
        state.sleepiness_max_timestamp = None;
        state.overload_start = None;
        if state.revive_level.is_none() {
            state.revive_level = Some(state.revive_target());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, UnavailableStore};
    use crate::types::HOUR_MS;

    const KEY: &str = "petz-state-v1";
    const T0: Timestamp = Timestamp(1_700_000_000_000);

    fn adapter_with(raw: &str) -> SnapshotAdapter {
        SnapshotAdapter::new(MemoryStore::with_entry(KEY, raw), KEY)
    }

    #[test]
    fn missing_key_is_first_launch() {
        let loaded = SnapshotAdapter::new(MemoryStore::new(), KEY).load(T0);
        assert!(loaded.first_launch);
        assert!(loaded.durable);
        assert_eq!(loaded.state, PetState::new("", T0));
    }

    #[test]
    fn unavailable_store_is_not_durable() {
        let adapter = SnapshotAdapter::new(UnavailableStore::new("no storage"), KEY);
        let loaded = adapter.load(T0);
        assert!(loaded.first_launch);
        assert!(!loaded.durable);
        assert!(!adapter.save(&loaded.state));
    }

    #[test]
    fn garbage_and_non_objects_are_discarded() {
        for raw in ["{not json", "[1,2,3]", "42", "null", "\"pet\""] {
            let loaded = adapter_with(raw).load(T0);
            assert!(loaded.first_launch, "{raw}");
            assert_eq!(loaded.state.name, "Aurora");
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let adapter = SnapshotAdapter::new(MemoryStore::new(), KEY);
        let mut state = PetState::new("Mochi", T0);
        state.hunger = 7;
        state.enrichment = 4;
        state.level = 3;
        state.last_tick = T0.plus_hours(2);

        assert!(adapter.save(&state));
        let loaded = adapter.load(T0.plus_hours(3));
        assert!(!loaded.first_launch);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn snapshot_uses_camel_case_and_explicit_nulls() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let adapter = SnapshotAdapter::new(std::sync::Arc::clone(&store), KEY);
        assert!(adapter.save(&PetState::new("Pip", T0)));

        let raw = store.get(KEY).expect("get").expect("saved");
        let json: Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json["lastTick"], T0.as_millis());
        assert!(json["hungerMaxTimestamp"].is_null());
        assert!(json["reviveLevel"].is_null());
        assert_eq!(json["deathSnarkLine"], "");
    }

    #[test]
    fn save_writes_the_normalised_projection() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let adapter = SnapshotAdapter::new(std::sync::Arc::clone(&store), KEY);
        let mut state = PetState::new("Pip", T0);
        state.hunger = 5;
        state.hunger_max_timestamp = Some(T0);
        state.revive_level = Some(3);
        state.death_note = "stale".into();

        assert!(adapter.save(&state));
        let raw = store.get(KEY).expect("get").expect("saved");
        let json: Value = serde_json::from_str(&raw).expect("json");
        assert!(json["hungerMaxTimestamp"].is_null());
        assert!(json["reviveLevel"].is_null());
        assert_eq!(json["deathNote"], "");
        assert_eq!(json["hunger"], 5);
        assert_eq!(state.revive_level, Some(3), "caller's state untouched");
    }

    #[test]
    fn fields_are_sanitised_independently() {
        let raw = r#"{
            "name": "   A very very long pet name indeed   ",
            "hunger": "12.6",
            "sleepiness": -4,
            "enrichment": 99,
            "bonding": "lots",
            "level": 0,
            "alive": "no",
            "lastTick": "yesterday",
            "createdAt": 1600000000000
        }"#;
        let state = adapter_with(raw).load(T0).state;
        assert_eq!(state.name, "A very very long p");
        assert_eq!(state.hunger, 13);
        assert_eq!(state.sleepiness, 0);
        assert_eq!(state.enrichment, 20);
        assert_eq!(state.bonding, 0);
        assert_eq!(state.level, 1);
        assert!(state.alive);
        assert_eq!(state.last_tick, T0);
        assert_eq!(state.created_at, Timestamp(1_600_000_000_000));
    }

    #[test]
    fn future_timestamps_are_clamped_to_now() {
        let future = T0.plus_hours(10).as_millis();
        let raw = format!(r#"{{"lastTick": {future}, "createdAt": {future}}}"#);
        let state = adapter_with(&raw).load(T0).state;
        assert_eq!(state.last_tick, T0);
        assert_eq!(state.created_at, T0);
    }

    #[test]
    fn capped_stat_without_timestamp_gets_one() {
        let last = T0.minus_millis(HOUR_MS).as_millis();
        let raw = format!(r#"{{"hunger": 20, "sleepiness": 20, "lastTick": {last}}}"#);
        let state = adapter_with(&raw).load(T0).state;
        assert_eq!(state.hunger_max_timestamp, Some(Timestamp(last)));
        assert_eq!(state.sleepiness_max_timestamp, Some(Timestamp(last)));
        assert_eq!(state.overload_start, Some(Timestamp(last)));
    }

    #[test]
    fn stale_timestamp_below_cap_is_cleared() {
        let raw = format!(
            r#"{{"hunger": 5, "hungerMaxTimestamp": {}, "overloadStart": {}}}"#,
            T0.as_millis(),
            T0.as_millis()
        );
        let state = adapter_with(&raw).load(T0).state;
        assert!(state.hunger_max_timestamp.is_none());
        assert!(state.overload_start.is_none());
    }

    #[test]
    fn dead_pet_gets_revive_level_and_no_timers() {
        let raw = format!(
            r#"{{"alive": false, "level": 5, "hunger": 20, "hungerMaxTimestamp": {}}}"#,
            T0.as_millis()
        );
        let state = adapter_with(&raw).load(T0).state;
        assert!(!state.alive);
        assert_eq!(state.revive_level, Some(4));
        assert!(state.hunger_max_timestamp.is_none());
        assert!(state.overload_start.is_none());
    }

    #[test]
    fn alive_pet_drops_death_fields() {
        let raw = r#"{"alive": true, "reviveLevel": 3, "deathNote": "old", "deathSnarkLine": "old"}"#;
        let state = adapter_with(raw).load(T0).state;
        assert!(state.revive_level.is_none());
        assert!(state.death_note.is_empty());
        assert!(state.death_snark_line.is_empty());
    }

    #[test]
    fn explicit_revive_level_is_clamped() {
        let raw = r#"{"alive": false, "level": 5, "reviveLevel": 400}"#;
        let state = adapter_with(raw).load(T0).state;
        assert_eq!(state.revive_level, Some(LEVEL_CAP));
    }
}
