//! Read-only presentation of a [`PetState`].
//!
//! Nothing here renders anything. These are the decisions a front-end needs
//! (bar fill, mood, crown, what the status line says) computed the same way
//! for every host.

use serde::Serialize;

use crate::config::RulesConfig;
use crate::types::{PetState, Timestamp, LEVEL_CAP, MAX_STAT};

/// Shown while dead when the save has no death note.
pub const PASSED_ON_FALLBACK: &str = "Your pet has passed on.";

/// Shown on the death card when the save has no snark line.
pub const SNARK_FALLBACK: &str = "Maybe try nurturing instead of neglect.";

/// Fill percentage for a stat bar: `round(value / 20 * 100)`, within `[0, 100]`.
#[must_use]
pub fn bar_percent(value: u8) -> u8 {
    let max = u16::from(MAX_STAT);
    let value = u16::from(value.min(MAX_STAT));
    let percent = (value * 100 + max / 2) / max;
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// How the pet is feeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// No need is at the warning threshold.
    Content,
    /// Hunger or sleepiness is at or past the warning threshold.
    Upset,
    /// Dead.
    Gone,
}

impl Mood {
    /// Mood of `state` under `rules`.
    #[must_use]
    pub fn of(state: &PetState, rules: &RulesConfig) -> Self {
        if !state.alive {
            return Self::Gone;
        }
        let warn = rules.warn_threshold();
        if state.hunger >= warn || state.sleepiness >= warn {
            Self::Upset
        } else {
            Self::Content
        }
    }
}

/// Complaints about needs at or past the warning threshold.
#[must_use]
pub fn warnings(state: &PetState, rules: &RulesConfig) -> Vec<String> {
    let warn = rules.warn_threshold();
    let mut out = Vec::new();
    if state.hunger >= warn {
        out.push(format!("{} is starving for a snack.", state.name));
    }
    if state.sleepiness >= warn {
        out.push(format!("{} is desperate for sleep.", state.name));
    }
    out
}

/// The status line: the death note while dead, otherwise the last message
/// (or a cozy default) followed by any warnings.
#[must_use]
pub fn status_text(state: &PetState, last_message: &str, rules: &RulesConfig) -> String {
    if !state.alive {
        let note = state.death_note.trim();
        return if note.is_empty() {
            PASSED_ON_FALLBACK.to_string()
        } else {
            note.to_string()
        };
    }

    let last = last_message.trim();
    let base = if last.is_empty() {
        format!("{} is feeling cozy.", state.name)
    } else {
        last.to_string()
    };

    let warnings = warnings(state, rules);
    if warnings.is_empty() {
        base
    } else {
        format!("{base} {}", warnings.join(" "))
    }
}

/// Label for the revive button, if the pet can be revived.
#[must_use]
pub fn revive_label(state: &PetState) -> Option<String> {
    if state.alive {
        return None;
    }
    let level = state.revive_level?;
    Some(if state.level > 1 {
        format!("Revive at level {level}")
    } else {
        "Revive your pet".to_string()
    })
}

/// Fill percentages for the four stat bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatBars {
    /// Hunger bar.
    pub hunger: u8,
    /// Sleepiness bar.
    pub sleepiness: u8,
    /// Enrichment bar.
    pub enrichment: u8,
    /// Bonding bar.
    pub bonding: u8,
}

/// The card shown in place of the pet after death.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeathCard {
    /// The remark picked at death.
    pub snark: String,
    /// "Revive them to return at level N." when revivable.
    pub revive_hint: Option<String>,
}

/// Public snapshot of the pet handed to hosts after every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetView {
    /// Display name.
    pub name: String,
    /// Friendship level.
    pub level: u8,
    /// Raw hunger.
    pub hunger: u8,
    /// Raw sleepiness.
    pub sleepiness: u8,
    /// Raw enrichment.
    pub enrichment: u8,
    /// Raw bonding.
    pub bonding: u8,
    /// Bar fill percentages.
    pub bars: StatBars,
    /// Whether the pet is alive.
    pub alive: bool,
    /// Current mood.
    pub mood: Mood,
    /// Alive at the level cap.
    pub crowned: bool,
    /// Revive button label.
    pub revive_label: Option<String>,
    /// Death card, while dead.
    pub death_card: Option<DeathCard>,
    /// When the pet was adopted.
    pub created_at: Timestamp,
}

impl PetView {
    /// Build the view of `state`.
    #[must_use]
    pub fn of(state: &PetState, rules: &RulesConfig) -> Self {
        let death_card = (!state.alive).then(|| DeathCard {
            snark: if state.death_snark_line.is_empty() {
                SNARK_FALLBACK.to_string()
            } else {
                state.death_snark_line.clone()
            },
            revive_hint: state
                .revive_level
                .map(|level| format!("Revive them to return at level {level}.")),
        });

        Self {
            name: state.name.clone(),
            level: state.level,
            hunger: state.hunger,
            sleepiness: state.sleepiness,
            enrichment: state.enrichment,
            bonding: state.bonding,
            bars: StatBars {
                hunger: bar_percent(state.hunger),
                sleepiness: bar_percent(state.sleepiness),
                enrichment: bar_percent(state.enrichment),
                bonding: bar_percent(state.bonding),
            },
            alive: state.alive,
            mood: Mood::of(state, rules),
            crowned: state.alive && state.level >= LEVEL_CAP,
            revive_label: revive_label(state),
            death_card,
            created_at: state.created_at,
        }
    }
}
