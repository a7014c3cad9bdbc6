//! SQLite-backed [`Store`].
//!
//! One small table holds every key:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS kv_store (
//!     key        TEXT PRIMARY KEY,
//!     value      TEXT NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```
//!
//! - WAL mode so a second process can read while the host is writing.
//! - Optional CRC-32 checksum to detect a save edited or torn on disk.
//! - Backup through SQLite's online-backup API.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{PetzError, Result};

use super::Store;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// CRC-32 (ISO 3309 polynomial, reflected).
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    data.iter().fold(0xFFFF_FFFF_u32, |crc, &byte| {
        (0..8).fold(crc ^ u32::from(byte), |c, _| {
            if c & 1 == 1 { (c >> 1) ^ POLY } else { c >> 1 }
        })
    }) ^ 0xFFFF_FFFF
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// Handle to an open SQLite save file.
///
/// ```no_run
/// # use petz_core::persistence::{SqliteStore, Store};
/// # use petz_core::config::PersistenceConfig;
/// let store = SqliteStore::open("petz.db", &PersistenceConfig::default())?;
/// store.set("petz-state-v1", "{}")?;
/// # Ok::<(), petz_core::PetzError>(())
/// ```
pub struct SqliteStore {
    conn: Connection,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("checksum_enabled", &self.checksum_enabled)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the save file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PetzError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "PETZ save file opened"
        );

        Ok(Self {
            conn,
            checksum_enabled: config.checksum_enabled,
            db_path,
        })
    }

    /// Open a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PetzError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn,
            checksum_enabled: config.checksum_enabled,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Copy the database to `dest_path` with SQLite's online-backup API.
    ///
    /// The source must pass [`Self::integrity_check`] first, so a damaged save
    /// never overwrites a good copy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PetzError::Corrupted`] if the source fails the
    /// integrity check, [`crate::PetzError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        if !self.integrity_check()? {
            warn!(path = %self.db_path.display(), "Integrity check failed, refusing backup");
            return Err(PetzError::Corrupted(self.db_path.display().to_string()));
        }
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Save file backup completed"
        );
        Ok(())
    }

    /// `PRAGMA integrity_check` passed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PetzError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    /// Path of the database file, `:memory:` for in-memory stores.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl Store for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value, checksum FROM kv_store WHERE key = ?1")?;

        let row: Option<(String, Option<String>)> = stmt
            .query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((value, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(value.as_bytes());
                if expected != actual {
                    warn!(
                        key,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, save may be corrupted"
                    );
                }
            }
        }

        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let checksum = self
            .checksum_enabled
            .then(|| crc32_hex(value.as_bytes()));
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![key, value, now, checksum],
        )?;
        Ok(())
    }
}
