//! Signals emitted to the UI collaborator.
//!
//! The core never plays animations or shows emotes itself. It reports what
//! happened and the host decides how to render it. [`PetEvent::StopSideEffects`]
//! tells the host to cancel every running animation timer; it accompanies
//! death, revival and adoption so no timer outlives the pet it was animating.

use serde::{Deserialize, Serialize};

/// Sprite sequence an action asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationCue {
    /// Eating a snack (played once).
    Snack,
    /// Cuddling (played once).
    Cuddle,
    /// Jump, spin and land (played once).
    Play,
    /// Running in a loop for a few seconds.
    Run,
    /// Sleeping in a loop for a few seconds.
    Sleep,
}

/// Short-lived overlay shown above the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emote {
    /// Triple heart.
    Heart,
    /// Sparkling stars.
    Stars,
    /// A fish snack.
    Fish,
}

/// Something the host may want to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PetEvent {
    /// Play a sprite sequence.
    Animate {
        /// Which sequence.
        cue: AnimationCue,
    },
    /// Flash an emote.
    Emote {
        /// Which emote.
        emote: Emote,
    },
    /// Friendship level went up.
    LevelUp {
        /// The new level.
        level: u8,
    },
    /// Both progress stats are maxed at the level cap.
    BondMaxed,
    /// The pet died of neglect.
    Died {
        /// Level it will come back at.
        revive_level: u8,
    },
    /// The pet came back.
    Revived {
        /// Level before death.
        previous_level: u8,
        /// Level after revival.
        level: u8,
    },
    /// A brand-new pet replaced the old one.
    Adopted,
    /// Cancel every running animation and emote timer.
    StopSideEffects,
}
