//! Error types for the PETZ core library.

use thiserror::Error;

/// Top-level error type for all PETZ operations.
///
/// Most of the simulation never fails: corrupted saves and broken stores are
/// absorbed by the persistence adapter. These errors surface from the store
/// implementations themselves and from the host boundary.
#[derive(Error, Debug)]
pub enum PetzError {
    /// The key-value store could not be reached at all.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The save file failed `PRAGMA integrity_check`.
    #[error("Save file is corrupted: {0}")]
    Corrupted(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An action name that does not map to any [`crate::ActionKind`].
    #[error("Unknown action: {0:?} (expected feed, pet, play, exercise or sleep)")]
    UnknownAction(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PetzError>;
