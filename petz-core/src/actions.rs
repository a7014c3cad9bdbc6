//! User actions: feed, pet, play, exercise, sleep.
//!
//! | action   | effects                                        |
//! |----------|------------------------------------------------|
//! | feed     | hunger → 0, bonding + 1                        |
//! | pet      | bonding + 3                                    |
//! | play     | bonding + 2, enrichment + 2, sleepiness + 1    |
//! | exercise | enrichment + 3, sleepiness + 1                 |
//! | sleep    | sleepiness → 0                                 |
//!
//! An action is one atomic update: catch up on elapsed time first, refuse if
//! the pet is dead, apply the deltas, then level up and re-check overload.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::config::RulesConfig;
use crate::error::PetzError;
use crate::events::{AnimationCue, Emote, PetEvent};
use crate::lifecycle::{self, Death, ProgressEvent, Tick};
use crate::types::{Need, PetState, Timestamp};
use crate::view;

/// Status line for actions attempted on a dead pet.
pub const DEAD_PET_MESSAGE: &str =
    "Your pet has already drifted away. Adopt a new friend to continue.";

/// Something the user can do to their pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Give a fish snack.
    Feed,
    /// Gentle scritches.
    Pet,
    /// Play together.
    Play,
    /// Run around.
    Exercise,
    /// Take a nap.
    Sleep,
}

impl ActionKind {
    /// Every action, in button order.
    pub const ALL: [Self; 5] = [Self::Feed, Self::Pet, Self::Play, Self::Exercise, Self::Sleep];

    /// Lowercase name used on the command line and in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Pet => "pet",
            Self::Play => "play",
            Self::Exercise => "exercise",
            Self::Sleep => "sleep",
        }
    }

    /// What the user reads after doing this.
    #[must_use]
    pub fn message(self, name: &str) -> String {
        match self {
            Self::Feed => format!("{name} devours the fishy snack."),
            Self::Pet => format!("{name} melts into your gentle scritches."),
            Self::Play => format!("{name} spins and tumbles with delight."),
            Self::Exercise => format!("{name} dashes around to burn off energy."),
            Self::Sleep => format!("{name} curls up for a restorative nap."),
        }
    }

    /// Sprite sequence the host should play.
    #[must_use]
    pub fn cue(self) -> AnimationCue {
        match self {
            Self::Feed => AnimationCue::Snack,
            Self::Pet => AnimationCue::Cuddle,
            Self::Play => AnimationCue::Play,
            Self::Exercise => AnimationCue::Run,
            Self::Sleep => AnimationCue::Sleep,
        }
    }

    /// Emote that accompanies the animation, if any.
    #[must_use]
    pub fn emote(self) -> Option<Emote> {
        match self {
            Self::Feed => Some(Emote::Fish),
            Self::Pet => Some(Emote::Heart),
            Self::Play | Self::Exercise | Self::Sleep => None,
        }
    }

    fn apply(self, state: &mut PetState, now: Timestamp) {
        match self {
            Self::Feed => {
                state.set_need(Need::Hunger, 0, None, now);
                state.add_bonding(1);
            }
            Self::Pet => state.add_bonding(3),
            Self::Play => {
                state.add_bonding(2);
                state.add_enrichment(2);
                state.increase_need(Need::Sleepiness, 1, now);
            }
            Self::Exercise => {
                state.add_enrichment(3);
                state.increase_need(Need::Sleepiness, 1, now);
            }
            Self::Sleep => state.set_need(Need::Sleepiness, 0, None, now),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = PetzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| PetzError::UnknownAction(s.to_string()))
    }
}

/// Everything an action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Whether the action was applied (false when the pet is dead).
    pub accepted: bool,
    /// Action line plus any level-up line. Warnings are not included.
    pub message: String,
    /// `message` with low-need warnings appended, or the death note.
    pub status: String,
    /// Signals for the host.
    pub events: Vec<PetEvent>,
    /// The catch-up tick that ran before the action.
    pub tick: Tick,
    /// Set if the pet died during this call.
    pub death: Option<Death>,
}

/// Apply one user action to `state` at `now`.
pub fn apply_action<R: Rng + ?Sized>(
    state: &mut PetState,
    kind: ActionKind,
    now: Timestamp,
    rules: &RulesConfig,
    rng: &mut R,
) -> ActionOutcome {
    let tick = lifecycle::tick(state, now, rules, rng);
    let mut events = Vec::new();
    let mut death = tick.death.clone();
    if let Some(d) = &death {
        events.push(PetEvent::Died {
            revive_level: d.revive_level,
        });
        events.push(PetEvent::StopSideEffects);
    }

    if !state.alive {
        return ActionOutcome {
            accepted: false,
            message: DEAD_PET_MESSAGE.to_string(),
            status: DEAD_PET_MESSAGE.to_string(),
            events,
            tick,
            death,
        };
    }

    kind.apply(state, now);
    events.push(PetEvent::Animate { cue: kind.cue() });
    if let Some(emote) = kind.emote() {
        events.push(PetEvent::Emote { emote });
    }

    let mut message = kind.message(&state.name);
    if let Some(progress) = lifecycle::evaluate_progress(state) {
        message.push(' ');
        message.push_str(&progress.message(&state.name));
        match progress {
            ProgressEvent::LevelUp { level } => {
                events.push(PetEvent::LevelUp { level });
                events.push(PetEvent::Emote {
                    emote: Emote::Stars,
                });
            }
            ProgressEvent::BondMaxed => events.push(PetEvent::BondMaxed),
        }
    }

    if let Some(d) = lifecycle::update_overload(state, now, rules, rng) {
        events.push(PetEvent::Died {
            revive_level: d.revive_level,
        });
        events.push(PetEvent::StopSideEffects);
        death = Some(d);
    }

    let status = view::status_text(state, &message, rules);
    ActionOutcome {
        accepted: true,
        message,
        status,
        events,
        tick,
        death,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HOUR_MS, LEVEL_CAP, MAX_STAT};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const T0: Timestamp = Timestamp(1_700_000_000_000);

    fn run(state: &mut PetState, kind: ActionKind, now: Timestamp) -> ActionOutcome {
        apply_action(
            state,
            kind,
            now,
            &RulesConfig::default(),
            &mut StdRng::seed_from_u64(1),
        )
    }

    #[test]
    fn parse_action_names() {
        assert_eq!("feed".parse::<ActionKind>().expect("feed"), ActionKind::Feed);
        assert_eq!(" Exercise ".parse::<ActionKind>().expect("exercise"), ActionKind::Exercise);
        assert!(matches!(
            "dance".parse::<ActionKind>(),
            Err(PetzError::UnknownAction(_))
        ));
    }

    #[test]
    fn feed_resets_hunger_and_bonds() {
        let mut state = PetState::new("Pip", T0);
        state.set_need(Need::Hunger, MAX_STAT, Some(T0), T0);

        let outcome = run(&mut state, ActionKind::Feed, T0);
        assert!(outcome.accepted);
        assert_eq!(state.hunger, 0);
        assert!(state.hunger_max_timestamp.is_none());
        assert_eq!(state.bonding, 1);
        assert_eq!(outcome.message, "Pip devours the fishy snack.");
        assert!(outcome.events.contains(&PetEvent::Emote { emote: Emote::Fish }));
    }

    #[test]
    fn pet_adds_three_bonding() {
        let mut state = PetState::new("Pip", T0);
        run(&mut state, ActionKind::Pet, T0);
        assert_eq!(state.bonding, 3);
    }

    #[test]
    fn play_raises_three_stats() {
        let mut state = PetState::new("Pip", T0);
        run(&mut state, ActionKind::Play, T0);
        assert_eq!((state.bonding, state.enrichment, state.sleepiness), (2, 2, 1));
    }

    #[test]
    fn exercise_to_cap_stamps_sleepiness() {
        let mut state = PetState::new("Pip", T0);
        state.sleepiness = 19;
        run(&mut state, ActionKind::Exercise, T0);
        assert_eq!(state.enrichment, 3);
        assert_eq!(state.sleepiness, MAX_STAT);
        assert_eq!(state.sleepiness_max_timestamp, Some(T0));
    }

    #[test]
    fn sleep_clears_sleepiness_and_overload() {
        let mut state = PetState::new("Pip", T0);
        state.set_need(Need::Hunger, MAX_STAT, Some(T0), T0);
        state.set_need(Need::Sleepiness, MAX_STAT, Some(T0), T0);
        state.overload_start = Some(T0);

        run(&mut state, ActionKind::Sleep, T0.plus_hours(1));
        assert_eq!(state.sleepiness, 0);
        assert!(state.sleepiness_max_timestamp.is_none());
        assert!(state.overload_start.is_none());
        assert!(state.hunger_max_timestamp.is_some());
    }

    #[test]
    fn action_catches_up_on_time_first() {
        let mut state = PetState::new("Pip", T0);
        run(&mut state, ActionKind::Pet, T0.plus_hours(4));
        assert_eq!(state.hunger, 4);
        assert_eq!(state.last_tick, T0.plus_hours(4));
    }

    #[test]
    fn dead_pet_rejects_actions() {
        let mut state = PetState::new("Pip", T0);
        lifecycle::die(&mut state, T0, &mut StdRng::seed_from_u64(3));

        let outcome = run(&mut state, ActionKind::Feed, T0.plus_hours(1));
        assert!(!outcome.accepted);
        assert_eq!(outcome.message, DEAD_PET_MESSAGE);
        assert_eq!(state.bonding, 0);
    }

    #[test]
    fn neglected_pet_dies_before_action_applies() {
        let mut state = PetState::new("Pip", T0);
        let now = T0.plus_hours(20).plus_days(7);

        let outcome = run(&mut state, ActionKind::Feed, now);
        assert!(!outcome.accepted);
        assert!(outcome.death.is_some());
        assert!(outcome.events.contains(&PetEvent::StopSideEffects));
        assert!(!state.alive);
    }

    #[test]
    fn play_until_level_up() {
        let mut state = PetState::new("Pip", T0);
        state.enrichment = 18;
        state.bonding = 17;

        let first = run(&mut state, ActionKind::Play, T0);
        assert_eq!((state.enrichment, state.bonding), (20, 19));
        assert!(first.events.iter().all(|e| !matches!(e, PetEvent::LevelUp { .. })));

        let second = run(&mut state, ActionKind::Play, T0);
        assert_eq!(state.level, 2);
        assert_eq!((state.enrichment, state.bonding), (0, 0));
        assert!(second.events.contains(&PetEvent::LevelUp { level: 2 }));
        assert_eq!(
            second.message,
            "Pip spins and tumbles with delight. Pip's friendship level rose to 2!"
        );
    }

    #[test]
    fn level_cap_holds_progress_at_max() {
        let mut state = PetState::new("Pip", T0);
        state.level = LEVEL_CAP;
        state.enrichment = 19;
        state.bonding = 19;

        let outcome = run(&mut state, ActionKind::Play, T0);
        assert_eq!(state.level, LEVEL_CAP);
        assert_eq!((state.enrichment, state.bonding), (MAX_STAT, MAX_STAT));
        assert!(outcome.events.contains(&PetEvent::BondMaxed));
    }

    #[test]
    fn status_carries_warnings() {
        let mut state = PetState::new("Pip", T0);
        state.hunger = 14;
        state.last_tick = T0.minus_millis(HOUR_MS);

        let outcome = run(&mut state, ActionKind::Pet, T0);
        assert_eq!(state.hunger, 15);
        assert_eq!(
            outcome.status,
            "Pip melts into your gentle scritches. Pip is starving for a snack."
        );
        assert!(!outcome.message.contains("starving"));
    }
}
