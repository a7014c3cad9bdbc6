//! Need decay: hour-granular catch-up over real elapsed time.
//!
//! Hunger and sleepiness each rise by one point per whole hour since
//! `last_tick`, capped at [`MAX_STAT`]. Partial hours are never consumed:
//! `last_tick` only advances by whole hours, so the leftover carries into the
//! next call and repeated calls neither lose nor double-count time.
//!
//! When a catch-up spans the moment a need hit its cap, the cap instant is
//! back-dated to the exact hour it crossed. A pet left alone for ten days
//! therefore starts its overload countdown when it actually starved, not when
//! the owner came back.

use tracing::debug;

use crate::types::{Need, PetState, Timestamp, HOUR_MS, MAX_STAT};

/// Advance the need stats of `state` up to `now`.
///
/// Returns `true` iff hunger or sleepiness changed value. Enrichment,
/// bonding and level are never touched.
///
/// A clock that moved backwards resets `last_tick` to `now` and applies no
/// decay.
pub fn advance(state: &mut PetState, now: Timestamp) -> bool {
    if state.last_tick > now {
        debug!(
            last_tick = %state.last_tick,
            now = %now,
            "Clock moved backwards; skipping decay"
        );
        state.last_tick = now;
        return false;
    }

    let elapsed = now.millis_since(state.last_tick);
    if elapsed < HOUR_MS {
        return false;
    }

    let increments = elapsed / HOUR_MS;
    let remainder = elapsed % HOUR_MS;

    let previous_hunger = state.hunger;
    let previous_sleepiness = state.sleepiness;

    for need in [Need::Hunger, Need::Sleepiness] {
        let previous = state.need(need);
        let next = add_hours(previous, increments);
        let reached_at = cap_instant(
            previous,
            next,
            state.max_timestamp(need).is_some(),
            increments,
            remainder,
            now,
        );
        state.set_need(need, next, reached_at, now);
    }

    state.last_tick = now.minus_millis(remainder);

    if increments > 1 {
        debug!(
            hours = increments,
            hunger = state.hunger,
            sleepiness = state.sleepiness,
            "Caught up on elapsed time"
        );
    }

    state.hunger != previous_hunger || state.sleepiness != previous_sleepiness
}

/// `previous + hours`, capped at [`MAX_STAT`].
fn add_hours(previous: u8, hours: i64) -> u8 {
    let step = u8::try_from(hours.clamp(0, i64::from(MAX_STAT))).unwrap_or(MAX_STAT);
    previous.saturating_add(step).min(MAX_STAT)
}

/// The instant a need entered the cap during this catch-up, if it needs one.
fn cap_instant(
    previous: u8,
    next: u8,
    has_timestamp: bool,
    increments: i64,
    remainder: i64,
    now: Timestamp,
) -> Option<Timestamp> {
    if next < MAX_STAT {
        return None;
    }
    if previous < MAX_STAT {
        let hours_to_cap = i64::from(MAX_STAT - previous);
        let overflow_hours = increments - hours_to_cap;
        Some(now.minus_millis(overflow_hours * HOUR_MS + remainder))
    } else if has_timestamp {
        None
    } else {
        Some(now.minus_millis(remainder))
    }
}
