//! Wiring a [`PetSession`] from configuration.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use petz_core::config::PersistenceConfig;
use petz_core::error::{PetzError, Result};
use petz_core::persistence::{MemoryStore, SnapshotAdapter, SqliteStore, Store, UnavailableStore};
use petz_core::{PetSession, PetzConfig, SystemClock};

/// The session type the host runs.
pub type HostSession = PetSession<SystemClock>;

/// Overrides from the command line.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Save file path, replacing `persistence.path`.
    pub db: Option<PathBuf>,
    /// Keep the pet in memory only.
    pub in_memory: bool,
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins; otherwise `log_level` applies to the petz crates.
/// Logs go to stderr so they never mix with the pet card on stdout.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "petz_core={log_level},petz_host={log_level},petz={log_level}"
        ))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Load the config file, or defaults when no path is given.
///
/// # Errors
///
/// Returns [`PetzError::Io`] if the file cannot be read, or
/// [`PetzError::Config`] if it is not valid TOML.
pub fn load_config(path: Option<&Path>) -> Result<PetzConfig> {
    path.map_or_else(|| Ok(PetzConfig::default()), PetzConfig::from_file)
}

/// Resolve the save file path.
#[must_use]
pub fn db_path(config: &PersistenceConfig, options: &StoreOptions) -> PathBuf {
    options
        .db
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.path))
}

/// Build the store the config asks for.
///
/// A save file that cannot be opened is not fatal: the pet runs in memory
/// and every report says it is not durable.
///
/// # Errors
///
/// Returns [`PetzError::Config`] for an unknown backend name.
pub fn build_store(config: &PersistenceConfig, options: &StoreOptions) -> Result<Box<dyn Store>> {
    if options.in_memory {
        return Ok(Box::new(MemoryStore::new()));
    }

    match config.backend.as_str() {
        "memory" => Ok(Box::new(MemoryStore::new())),
        "sqlite" => {
            let path = db_path(config, options);
            match SqliteStore::open(&path, config) {
                Ok(store) => Ok(Box::new(store)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Save file unavailable, progress will not persist");
                    Ok(Box::new(UnavailableStore::new(e.to_string())))
                }
            }
        }
        other => Err(PetzError::Config(format!(
            "unknown persistence backend {other:?} (expected \"sqlite\" or \"memory\")"
        ))),
    }
}

/// Open the pet session on the system clock.
///
/// # Errors
///
/// Returns [`PetzError::Config`] for an unknown backend name.
pub fn open_session(config: &PetzConfig, options: &StoreOptions) -> Result<HostSession> {
    let store = build_store(&config.persistence, options)?;
    let adapter = SnapshotAdapter::new(store, config.persistence.storage_key.clone());
    Ok(PetSession::open(
        adapter,
        SystemClock,
        config.rules.clone(),
        StdRng::from_entropy(),
    ))
}
