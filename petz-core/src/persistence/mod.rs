//! Persistence layer: a key-value [`Store`] and the [`SnapshotAdapter`] that
//! turns a stored snapshot into a trustworthy [`crate::PetState`].

pub mod adapter;
pub mod sqlite;
pub mod store;

pub use adapter::{Loaded, SnapshotAdapter};
pub use sqlite::SqliteStore;
pub use store::{MemoryStore, Store, UnavailableStore};
