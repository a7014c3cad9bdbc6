//! Lifecycle controller: leveling, overload → death, revival.
//!
//! ```text
//!            overload ≥ duration             revive()
//!   Alive ───────────────────────▶ Dead ───────────────▶ Alive
//!     ▲ │                                                (level − 1)
//!     └─┘ enrichment = bonding = 20 → level + 1
//! ```
//!
//! Every transition here is idempotent: dying twice, reviving a live pet or
//! repairing an already consistent save changes nothing.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::config::RulesConfig;
use crate::decay;
use crate::types::{PetState, Timestamp, LEVEL_CAP, MAX_STAT};

/// Remarks picked at random when a pet dies.
pub const DEATH_SNARK: [&str; 4] = [
    "Maybe try feeding them before they starve next time.",
    "Calling that “parenting” was generous at best.",
    "You really just watched the comfort bars max out, huh?",
    "Neglect speedrun complete. Congrats, I guess.",
];

/// Marker that tells a death note already explains how to revive.
const REVIVE_MARKER: &str = "Revive them";

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of a completed enrichment + bonding pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Level rose; both progress stats were reset.
    LevelUp {
        /// The new level.
        level: u8,
    },
    /// Already at [`LEVEL_CAP`]; both progress stats stay at max.
    BondMaxed,
}

impl ProgressEvent {
    /// User-facing line for this event.
    #[must_use]
    pub fn message(self, name: &str) -> String {
        match self {
            Self::LevelUp { level } => format!("{name}'s friendship level rose to {level}!"),
            Self::BondMaxed => format!("{name} cannot get any closer—this bond is legendary."),
        }
    }
}

/// Details of a death transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Death {
    /// Level the pet had when it died.
    pub level: u8,
    /// Level it will return at.
    pub revive_level: u8,
    /// The remark that was picked.
    pub snark: String,
}

/// Details of a revival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revival {
    /// Level before death.
    pub previous_level: u8,
    /// Level after revival.
    pub level: u8,
}

impl Revival {
    /// Whether the pet came back weaker.
    #[must_use]
    pub fn level_dropped(self) -> bool {
        self.level < self.previous_level
    }

    /// User-facing line for this revival.
    #[must_use]
    pub fn message(self, name: &str) -> String {
        if self.level_dropped() {
            format!("{name} returns, but their friendship level slipped to {}.", self.level)
        } else {
            format!("{name} returns, grateful for a second chance.")
        }
    }
}

/// What one background tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tick {
    /// A need stat changed value.
    pub progressed: bool,
    /// Progress stats were found saturated and resolved.
    pub progress: Option<ProgressEvent>,
    /// The overload countdown ran out during this tick.
    pub death: Option<Death>,
}

impl Tick {
    /// Whether the state changed in a way worth saving.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.progressed
            || self.death.is_some()
            || matches!(self.progress, Some(ProgressEvent::LevelUp { .. }))
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Decay the needs up to `now`, then run leveling and the overload check.
///
/// A dead pet does not decay; its `last_tick` just follows the clock.
pub fn tick<R: Rng + ?Sized>(
    state: &mut PetState,
    now: Timestamp,
    rules: &RulesConfig,
    rng: &mut R,
) -> Tick {
    if !state.alive {
        state.last_tick = now;
        return Tick::default();
    }

    let progressed = decay::advance(state, now);
    let progress = evaluate_progress(state);
    let death = update_overload(state, now, rules, rng);

    Tick {
        progressed,
        progress,
        death,
    }
}

// ---------------------------------------------------------------------------
// Leveling
// ---------------------------------------------------------------------------

/// Resolve a saturated enrichment + bonding pair.
///
/// Must run after anything that raises progress stats.
pub fn evaluate_progress(state: &mut PetState) -> Option<ProgressEvent> {
    if state.enrichment < MAX_STAT || state.bonding < MAX_STAT {
        return None;
    }

    if state.level < LEVEL_CAP {
        state.level += 1;
        state.enrichment = 0;
        state.bonding = 0;
        info!(name = %state.name, level = state.level, "Friendship level up");
        Some(ProgressEvent::LevelUp { level: state.level })
    } else {
        state.enrichment = MAX_STAT;
        state.bonding = MAX_STAT;
        Some(ProgressEvent::BondMaxed)
    }
}

// ---------------------------------------------------------------------------
// Overload & death
// ---------------------------------------------------------------------------

/// The derived overload start: the later cap instant, when both needs are capped.
#[must_use]
pub fn overload_start(state: &PetState) -> Option<Timestamp> {
    match (state.hunger_max_timestamp, state.sleepiness_max_timestamp) {
        (Some(hunger), Some(sleepiness)) => Some(hunger.max(sleepiness)),
        _ => None,
    }
}

/// Recompute `overload_start` and kill the pet if the countdown has run out.
pub fn update_overload<R: Rng + ?Sized>(
    state: &mut PetState,
    now: Timestamp,
    rules: &RulesConfig,
    rng: &mut R,
) -> Option<Death> {
    state.overload_start = overload_start(state);
    match state.overload_start {
        Some(start) if now.millis_since(start) >= rules.overload_duration_ms() => {
            die(state, now, rng)
        }
        _ => None,
    }
}

/// Kill the pet. Does nothing if it is already dead.
pub fn die<R: Rng + ?Sized>(state: &mut PetState, now: Timestamp, rng: &mut R) -> Option<Death> {
    if !state.alive {
        return None;
    }

    let level = state.level;
    let revive_level = state.revive_target();
    let snark = DEATH_SNARK.choose(rng).copied().unwrap_or(DEATH_SNARK[0]);

    state.alive = false;
    state.last_tick = now;
    state.hunger_max_timestamp = None;
    state.sleepiness_max_timestamp = None;
    state.overload_start = None;
    state.death_snark_line = snark.to_string();
    state.death_note = format!("Your pet has died. {snark}{}", revive_hint(level, revive_level));
    state.revive_level = Some(revive_level);

    info!(name = %state.name, level, revive_level, "Pet died of neglect");

    Some(Death {
        level,
        revive_level,
        snark: snark.to_string(),
    })
}

fn revive_hint(level: u8, revive_level: u8) -> String {
    if level > 1 {
        format!(" Revive them to bring them back at level {revive_level}.")
    } else {
        " Revive them to give them another chance.".to_string()
    }
}

// ---------------------------------------------------------------------------
// Revival
// ---------------------------------------------------------------------------

/// Bring a dead pet back at its revive level with fresh stats.
///
/// Does nothing if the pet is alive or has no revive level.
pub fn revive(state: &mut PetState, now: Timestamp) -> Option<Revival> {
    if state.alive {
        return None;
    }
    let revive_level = state.revive_level?;

    let previous_level = state.level;
    let level = revive_level.clamp(1, LEVEL_CAP);

    state.level = level;
    state.alive = true;
    state.revive_level = None;
    state.hunger = 0;
    state.sleepiness = 0;
    state.enrichment = 0;
    state.bonding = 0;
    state.last_tick = now;
    state.hunger_max_timestamp = None;
    state.sleepiness_max_timestamp = None;
    state.overload_start = None;
    state.death_note.clear();
    state.death_snark_line.clear();

    info!(name = %state.name, previous_level, level, "Pet revived");

    Some(Revival {
        previous_level,
        level,
    })
}

/// Make sure a dead pet can be revived and its note says how.
///
/// Older or damaged saves may hold a dead pet without a revive level. Safe to
/// call on every load; returns whether anything changed.
pub fn ensure_revive_available(state: &mut PetState) -> bool {
    if state.alive {
        return false;
    }

    let mut changed = false;
    let revive_level = state
        .revive_level
        .map_or_else(|| state.revive_target(), |level| level.clamp(1, LEVEL_CAP));
    if state.revive_level != Some(revive_level) {
        changed = true;
        state.revive_level = Some(revive_level);
    }

    let trimmed = state.death_note.trim();
    let base = if trimmed.is_empty() {
        if state.death_snark_line.is_empty() {
            "Your pet has died.".to_string()
        } else {
            format!("Your pet has died. {}", state.death_snark_line)
        }
    } else {
        trimmed.to_string()
    };

    let note = if base.contains(REVIVE_MARKER) {
        base
    } else {
        format!("{base}{}", revive_hint(state.level, revive_level))
    };
    if note != state.death_note {
        state.death_note = note;
        changed = true;
    }

    changed
}
