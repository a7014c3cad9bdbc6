//! The facade a host drives.
//!
//! A [`PetSession`] owns the one live [`PetState`] together with everything
//! needed to move it forward: the snapshot adapter, a clock, the rules and the
//! random source for death lines. Hosts call [`PetSession::tick`] on a timer
//! and the action methods on user input; every call returns a [`Report`] to
//! render.

use rand::RngCore;
use serde::Serialize;
use tracing::info;

use crate::actions::{self, ActionKind};
use crate::clock::Clock;
use crate::config::RulesConfig;
use crate::events::{Emote, PetEvent};
use crate::lifecycle::{self, ProgressEvent};
use crate::persistence::SnapshotAdapter;
use crate::types::{sanitize_name, PetState, Timestamp};
use crate::view::{self, PetView};

/// What the host should show after a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Public snapshot of the pet.
    pub view: PetView,
    /// Status line.
    pub status: String,
    /// Signals produced by this call, in order.
    pub events: Vec<PetEvent>,
    /// Whether the last save reached the store.
    pub durable: bool,
}

/// A running pet.
pub struct PetSession<C: Clock> {
    state: PetState,
    adapter: SnapshotAdapter,
    clock: C,
    rules: RulesConfig,
    rng: Box<dyn RngCore + Send>,
    last_message: String,
    durable: bool,
    first_launch: bool,
}

impl<C: Clock> std::fmt::Debug for PetSession<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetSession")
            .field("state", &self.state)
            .field("adapter", &self.adapter)
            .field("durable", &self.durable)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> PetSession<C> {
    /// Load the pet and get it ready for the first tick.
    ///
    /// A brand-new pet is saved straight away so its birth time sticks. A dead
    /// pet without a usable revive level is repaired and saved. A saturated
    /// enrichment/bonding pair left over from an interrupted session is
    /// resolved into a level-up, but only while the pet is alive.
    pub fn open(
        adapter: SnapshotAdapter,
        clock: C,
        rules: RulesConfig,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        let loaded = adapter.load(clock.now());
        let mut session = Self {
            state: loaded.state,
            adapter,
            clock,
            rules,
            rng: Box::new(rng),
            last_message: String::new(),
            durable: loaded.durable,
            first_launch: loaded.first_launch,
        };

        let repaired = lifecycle::ensure_revive_available(&mut session.state);
        let leveled = session.state.alive
            && matches!(
                lifecycle::evaluate_progress(&mut session.state),
                Some(ProgressEvent::LevelUp { .. })
            );
        if session.first_launch || repaired || leveled {
            session.save();
        }

        session.last_message = if session.first_launch {
            format!("{} is ready for cozy adventures.", session.state.name)
        } else if session.state.alive {
            format!("{} missed you!", session.state.name)
        } else {
            String::new()
        };

        info!(
            name = %session.state.name,
            alive = session.state.alive,
            level = session.state.level,
            first_launch = session.first_launch,
            durable = session.durable,
            "Pet session opened"
        );
        session
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The live state.
    #[must_use]
    pub fn state(&self) -> &PetState {
        &self.state
    }

    /// The session clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The rules in force.
    #[must_use]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// No snapshot existed when the session opened.
    #[must_use]
    pub fn is_first_launch(&self) -> bool {
        self.first_launch
    }

    /// Current view and status without changing anything.
    #[must_use]
    pub fn report(&self) -> Report {
        self.report_with(Vec::new())
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Advance the pet to `now`. Saves when a need moved, the pet leveled
    /// or the pet died.
    pub fn tick(&mut self, now: Timestamp) -> Report {
        let tick = lifecycle::tick(&mut self.state, now, &self.rules, &mut *self.rng);

        let mut events = Vec::new();
        if let Some(ProgressEvent::LevelUp { level }) = tick.progress {
            events.push(PetEvent::LevelUp { level });
        }
        if let Some(death) = &tick.death {
            events.push(PetEvent::Died {
                revive_level: death.revive_level,
            });
            events.push(PetEvent::StopSideEffects);
        }

        if tick.changed() {
            self.save();
        }
        self.report_with(events)
    }

    /// [`Self::tick`] at the clock's current time.
    pub fn tick_now(&mut self) -> Report {
        let now = self.clock.now();
        self.tick(now)
    }

    // ------------------------------------------------------------------
    // User commands
    // ------------------------------------------------------------------

    /// Run one care action at `now`.
    pub fn apply_action(&mut self, kind: ActionKind, now: Timestamp) -> Report {
        let outcome =
            actions::apply_action(&mut self.state, kind, now, &self.rules, &mut *self.rng);

        if outcome.accepted {
            self.last_message = outcome.message;
        }
        if outcome.accepted || outcome.tick.changed() {
            self.save();
        }

        Report {
            view: PetView::of(&self.state, &self.rules),
            status: outcome.status,
            events: outcome.events,
            durable: self.durable,
        }
    }

    /// Replace the pet with a brand-new one, alive or not.
    pub fn adopt(&mut self, name: Option<&str>) -> Report {
        let now = self.clock.now();
        self.state = PetState::new(name.unwrap_or_default(), now);
        self.last_message = match name {
            Some(_) => format!("{} wiggles in to meet you.", self.state.name),
            None => format!("{} is ready for cozy adventures.", self.state.name),
        };
        self.first_launch = false;

        info!(name = %self.state.name, "New pet adopted");
        self.save();
        self.report_with(vec![
            PetEvent::StopSideEffects,
            PetEvent::Adopted,
            PetEvent::Emote {
                emote: Emote::Heart,
            },
        ])
    }

    /// Bring a dead pet back. Does nothing while alive.
    pub fn revive(&mut self) -> Report {
        let now = self.clock.now();
        let Some(revival) = lifecycle::revive(&mut self.state, now) else {
            return self.report();
        };

        self.last_message = revival.message(&self.state.name);
        self.save();
        self.report_with(vec![
            PetEvent::StopSideEffects,
            PetEvent::Revived {
                previous_level: revival.previous_level,
                level: revival.level,
            },
            PetEvent::Emote {
                emote: Emote::Heart,
            },
        ])
    }

    /// Rename a living pet. The name is sanitised; an unchanged name is a
    /// no-op.
    pub fn rename(&mut self, name: &str) -> Report {
        if !self.state.alive {
            return self.report();
        }
        let clean = sanitize_name(name);
        if clean == self.state.name {
            return self.report();
        }

        info!(from = %self.state.name, to = %clean, "Pet renamed");
        self.state.name = clean;
        self.last_message = format!("{} loves their new name.", self.state.name);
        self.save();
        self.report()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn save(&mut self) {
        self.durable = self.adapter.save(&self.state);
    }

    fn report_with(&self, events: Vec<PetEvent>) -> Report {
        Report {
            view: PetView::of(&self.state, &self.rules),
            status: view::status_text(&self.state, &self.last_message, &self.rules),
            events,
            durable: self.durable,
        }
    }
}
