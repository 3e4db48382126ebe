//! Pluggable map backends.
//!
//! The backend's own lock is the store's map lock: it guards every read and
//! write of the in-memory mapping and is never held across disk I/O.
//! Implement [`MapBackend`] to bring your own concurrent map.

use std::collections::HashMap;

/// Trait that a concurrent `i64 -> String` map must satisfy to back a
/// [`TagStore`](crate::TagStore).
///
/// Every method works with owned values so the store API stays uniform
/// regardless of how the backend keeps things internally. Backends that keep
/// values behind an `Arc` (like ShardMap) will clone on read.
pub trait MapBackend: Send + Sync {
    /// Insert or overwrite the tag for `key`, returning the previous tag.
    fn insert(&self, key: i64, tag: String) -> Option<String>;

    /// Look up the tag for `key`.
    fn get(&self, key: i64) -> Option<String>;

    /// Copy of every entry. Must not keep any lock once it returns.
    fn snapshot(&self) -> HashMap<i64, String>;

    /// Number of entries.
    fn map_len(&self) -> usize;

    /// Check if a key exists without cloning the tag.
    fn contains_key(&self, key: i64) -> bool {
        self.get(key).is_some()
    }
}

// ---- RwLock<HashMap> ---------------------------------------------------------

impl MapBackend for parking_lot::RwLock<HashMap<i64, String>> {
    fn insert(&self, key: i64, tag: String) -> Option<String> {
        self.write().insert(key, tag)
    }

    fn get(&self, key: i64) -> Option<String> {
        self.read().get(&key).cloned()
    }

    fn snapshot(&self) -> HashMap<i64, String> {
        self.read().clone()
    }

    fn map_len(&self) -> usize {
        self.read().len()
    }

    fn contains_key(&self, key: i64) -> bool {
        self.read().contains_key(&key)
    }
}

// ---- ShardMap ----------------------------------------------------------------

impl MapBackend for shardmap::ShardMap<i64, String> {
    fn insert(&self, key: i64, tag: String) -> Option<String> {
        self.insert(key, tag).map(|arc| (*arc).clone())
    }

    fn get(&self, key: i64) -> Option<String> {
        self.get(&key).map(|arc| (*arc).clone())
    }

    // Each shard is copied under its own lock. Updates are single-key, so the
    // union is always a state every key has passed through.
    fn snapshot(&self) -> HashMap<i64, String> {
        self.iter_snapshot()
            .map(|(k, arc_v)| (k, (*arc_v).clone()))
            .collect()
    }

    fn map_len(&self) -> usize {
        self.len()
    }

    fn contains_key(&self, key: i64) -> bool {
        shardmap::ShardMap::get(self, &key).is_some()
    }
}

// ---- DashMap (feature-gated) -------------------------------------------------

#[cfg(feature = "dashmap")]
impl MapBackend for dashmap::DashMap<i64, String> {
    fn insert(&self, key: i64, tag: String) -> Option<String> {
        self.insert(key, tag)
    }

    fn get(&self, key: i64) -> Option<String> {
        self.get(&key).map(|r| r.value().clone())
    }

    fn snapshot(&self) -> HashMap<i64, String> {
        self.iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }

    fn map_len(&self) -> usize {
        self.len()
    }

    fn contains_key(&self, key: i64) -> bool {
        dashmap::DashMap::contains_key(self, &key)
    }
}
