//! # petz-host: Terminal host for PETZ
//!
//! Owns everything `petz-core` leaves to its environment: the system clock,
//! the save file, the tracing subscriber, the timer loop and the screen.
//!
//! ## Modules
//!
//! - `setup`: config loading, store selection, session construction, logging
//! - `render`: plain-text pet card for a [`petz_core::Report`]

#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod render;
pub mod setup;

pub use render::render;
pub use setup::{init_tracing, load_config, open_session, HostSession, StoreOptions};
