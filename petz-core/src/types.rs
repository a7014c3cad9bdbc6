//! Core type definitions for the PETZ simulation.
//!
//! [`PetState`] serialises directly into the persisted snapshot format: a flat
//! camelCase JSON record with millisecond timestamps and explicit `null`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Rules that never change
// ---------------------------------------------------------------------------

/// Upper bound of every stat (hunger, sleepiness, enrichment, bonding).
pub const MAX_STAT: u8 = 20;

/// Highest friendship level a pet can reach.
pub const LEVEL_CAP: u8 = 20;

/// Name given to a pet when the user supplies none.
pub const DEFAULT_NAME: &str = "Aurora";

/// Maximum pet name length, in characters, after trimming.
pub const MAX_NAME_LENGTH: usize = 18;

/// One hour in milliseconds, the decay granularity.
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * HOUR_MS;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Wall-clock instant in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Wrap a raw millisecond count.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Raw milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self` (negative if `earlier` is later).
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// This instant shifted forward by `ms`.
    #[must_use]
    pub const fn plus_millis(self, ms: i64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// This instant shifted backward by `ms`.
    #[must_use]
    pub const fn minus_millis(self, ms: i64) -> Self {
        Self(self.0.saturating_sub(ms))
    }

    /// This instant shifted forward by whole hours.
    #[must_use]
    pub const fn plus_hours(self, hours: i64) -> Self {
        self.plus_millis(hours.saturating_mul(HOUR_MS))
    }

    /// This instant shifted forward by whole days.
    #[must_use]
    pub const fn plus_days(self, days: i64) -> Self {
        self.plus_millis(days.saturating_mul(DAY_MS))
    }

    /// Convert to a chrono UTC datetime, if representable.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.to_rfc3339()),
            None => write!(f, "{}ms", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// The two stats that rise on their own and must be lowered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Need {
    /// Rises hourly; reset by feeding.
    Hunger,
    /// Rises hourly and with activity; reset by sleeping.
    Sleepiness,
}

impl fmt::Display for Need {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hunger => write!(f, "hunger"),
            Self::Sleepiness => write!(f, "sleepiness"),
        }
    }
}

/// Trim a user-supplied name, fall back to [`DEFAULT_NAME`] when empty and cap
/// it at [`MAX_NAME_LENGTH`] characters.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DEFAULT_NAME.to_string();
    }
    trimmed.chars().take(MAX_NAME_LENGTH).collect()
}

// ---------------------------------------------------------------------------
// Pet State
// ---------------------------------------------------------------------------

/// The one pet this process owns.
///
/// Every mutation goes through [`crate::decay`], [`crate::lifecycle`] or
/// [`crate::actions`]; those modules keep the max-timestamp and overload
/// bookkeeping consistent with the stat values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetState {
    /// Display name, 1–18 characters.
    pub name: String,
    /// Need stat, 0–20. Lower is better.
    pub hunger: u8,
    /// Need stat, 0–20. Lower is better.
    pub sleepiness: u8,
    /// Progress stat, 0–20. Higher is better.
    pub enrichment: u8,
    /// Progress stat, 0–20. Higher is better.
    pub bonding: u8,
    /// Friendship level, 1–20.
    pub level: u8,
    /// Whether the pet is alive.
    pub alive: bool,
    /// Last instant decay was applied up to.
    pub last_tick: Timestamp,
    /// Instant hunger reached [`MAX_STAT`]; `None` while below cap.
    pub hunger_max_timestamp: Option<Timestamp>,
    /// Instant sleepiness reached [`MAX_STAT`]; `None` while below cap.
    pub sleepiness_max_timestamp: Option<Timestamp>,
    /// Start of the death countdown: the later max-timestamp, when both are set.
    pub overload_start: Option<Timestamp>,
    /// Full death message shown while dead. Empty when alive.
    pub death_note: String,
    /// The snark line picked at death. Empty when alive.
    pub death_snark_line: String,
    /// Level the pet returns at when revived. Only set while dead.
    pub revive_level: Option<u8>,
    /// When this pet was adopted.
    pub created_at: Timestamp,
}

impl PetState {
    /// A freshly adopted pet: all stats zero, level 1, alive.
    #[must_use]
    pub fn new(name: &str, now: Timestamp) -> Self {
        Self {
            name: sanitize_name(name),
            hunger: 0,
            sleepiness: 0,
            enrichment: 0,
            bonding: 0,
            level: 1,
            alive: true,
            last_tick: now,
            hunger_max_timestamp: None,
            sleepiness_max_timestamp: None,
            overload_start: None,
            death_note: String::new(),
            death_snark_line: String::new(),
            revive_level: None,
            created_at: now,
        }
    }

    /// Current value of a need stat.
    #[must_use]
    pub fn need(&self, need: Need) -> u8 {
        match need {
            Need::Hunger => self.hunger,
            Need::Sleepiness => self.sleepiness,
        }
    }

    /// Recorded cap instant of a need stat.
    #[must_use]
    pub fn max_timestamp(&self, need: Need) -> Option<Timestamp> {
        match need {
            Need::Hunger => self.hunger_max_timestamp,
            Need::Sleepiness => self.sleepiness_max_timestamp,
        }
    }

    fn need_slots(&mut self, need: Need) -> (&mut u8, &mut Option<Timestamp>) {
        match need {
            Need::Hunger => (&mut self.hunger, &mut self.hunger_max_timestamp),
            Need::Sleepiness => (&mut self.sleepiness, &mut self.sleepiness_max_timestamp),
        }
    }

    /// Set a need stat, keeping its max-timestamp in step.
    ///
    /// Reaching the cap records `reached_at` (or `now`) unless the stat was
    /// already capped with a timestamp. Dropping below the cap clears it.
    pub fn set_need(&mut self, need: Need, value: u8, reached_at: Option<Timestamp>, now: Timestamp) {
        let clamped = value.min(MAX_STAT);
        let (stat, max_ts) = self.need_slots(need);
        let was_max = *stat >= MAX_STAT;
        *stat = clamped;

        if clamped >= MAX_STAT {
            if !was_max || max_ts.is_none() {
                *max_ts = Some(reached_at.unwrap_or(now));
            }
        } else {
            *max_ts = None;
        }
    }

    /// Raise a need stat by `amount`, stamping `now` if this reaches the cap.
    pub fn increase_need(&mut self, need: Need, amount: u8, now: Timestamp) {
        let previous = self.need(need);
        let next = previous.saturating_add(amount).min(MAX_STAT);
        let reached_at = (next >= MAX_STAT && previous < MAX_STAT).then_some(now);
        self.set_need(need, next, reached_at, now);
    }

    /// Raise enrichment, saturating at [`MAX_STAT`].
    pub fn add_enrichment(&mut self, amount: u8) {
        self.enrichment = self.enrichment.saturating_add(amount).min(MAX_STAT);
    }

    /// Raise bonding, saturating at [`MAX_STAT`].
    pub fn add_bonding(&mut self, amount: u8) {
        self.bonding = self.bonding.saturating_add(amount).min(MAX_STAT);
    }

    /// Level the pet would come back at if it died right now.
    #[must_use]
    pub fn revive_target(&self) -> u8 {
        self.level.saturating_sub(1).clamp(1, LEVEL_CAP)
    }

    /// Both need stats capped with recorded timestamps.
    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        self.hunger_max_timestamp.is_some() && self.sleepiness_max_timestamp.is_some()
    }
}
