//! Account-id to chat-tag registry, persisted to a single JSON file.
//!
//! The [`TagStore`] keeps the mapping in memory and mirrors it to disk on a
//! background thread. Lookups and upserts never touch the disk; every upsert
//! schedules a persistence pass that writes a fresh snapshot of the whole map.
//!
//! ```rust,no_run
//! use tag_registry::TagStore;
//!
//! let store = TagStore::open("storage.json").unwrap();
//! store.set(76561198000000000, "Alice#1234");
//! assert_eq!(store.get(76561198000000000), "Alice#1234");
//! assert_eq!(store.get(1), "");
//! ```
//!
//! The [`server`] module exposes the store over HTTP behind a shared-secret
//! header check.
//!
//! **Single-process only.** If multiple processes open the same file they will
//! clobber each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod config;
pub mod error;
pub mod flush;
pub mod logging;
pub mod persist;
pub mod serializer;
pub mod server;
pub mod store;

pub use error::{Error, Result};
pub use store::{TagStore, TagStoreBuilder, TagStoreHandle};

/// Default backend: a `parking_lot` read-write lock around a `HashMap`.
pub type DefaultBackend = parking_lot::RwLock<std::collections::HashMap<i64, String>>;
