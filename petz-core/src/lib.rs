//! # PETZ Core Library
//!
//! Game-agnostic state machine for a persistent virtual pet.
//!
//! A pet has two **need stats** (hunger, sleepiness) that rise by one point
//! per real hour and two **progress stats** (enrichment, bonding) that only
//! rise through user actions:
//!
//! - **Decay**: hour-granular catch-up over any elapsed span ([`decay`])
//! - **Lifecycle**: leveling, overload → death, revival ([`lifecycle`])
//! - **Actions**: feed / pet / play / exercise / sleep ([`actions`])
//! - **Persistence**: sanitising snapshot load/save over a key-value [`Store`]
//! - **Session**: the facade a host drives with ticks and actions ([`PetSession`])
//!
//! Time is always passed in explicitly, so whole days of neglect can be
//! simulated in a unit test.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actions;
pub mod clock;
pub mod config;
pub mod decay;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod persistence;
pub mod session;
pub mod types;
pub mod view;

pub use actions::ActionKind;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PetzConfig;
pub use error::PetzError;
pub use events::PetEvent;
pub use persistence::{MemoryStore, SnapshotAdapter, SqliteStore, Store, UnavailableStore};
pub use session::{PetSession, Report};
pub use view::PetView;
pub use types::*;
