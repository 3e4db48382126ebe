//! Core store type, handle, and builder.

use crate::backend::MapBackend;
use crate::error::Result;
use crate::flush::{self, PersistWorker, Trigger};
use crate::persist::{load, Persister};
use crate::serializer::JsonSerializer;
use crate::DefaultBackend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Persistent map from account id to tag.
///
/// Lookups and upserts only touch memory. Every [`set`](Self::set) nudges a
/// background worker that writes a full snapshot of the map to disk; the call
/// itself never waits for that write.
///
/// All operations are thread-safe. The map lock comes from the backend `M`,
/// the persistence lock from the shared [`Persister`].
pub struct TagStore<M = DefaultBackend> {
    pub(crate) map: Arc<M>,
    pub(crate) persister: Arc<Persister>,
    pub(crate) trigger: Trigger,
}

impl TagStore {
    /// Open (or create) a store at `path` with the default backend and
    /// compact JSON.
    pub fn open(path: impl AsRef<Path>) -> Result<TagStoreHandle> {
        Self::builder(path).build()
    }

    /// Start configuring a store with the default backend. Call
    /// [`.build()`](TagStoreBuilder::build) when ready.
    pub fn builder(path: impl AsRef<Path>) -> TagStoreBuilder {
        TagStoreBuilder::new(path)
    }
}

impl<M> TagStore<M>
where
    M: MapBackend + Default + 'static,
{
    /// Like [`open`](TagStore::open) with a chosen map backend.
    pub fn open_with_backend(path: impl AsRef<Path>) -> Result<TagStoreHandle<M>> {
        Self::builder_with_backend(path).build()
    }

    /// Like [`builder`](TagStore::builder) with a chosen map backend.
    pub fn builder_with_backend(path: impl AsRef<Path>) -> TagStoreBuilder<M> {
        TagStoreBuilder::new(path)
    }
}

impl<M: MapBackend> TagStore<M> {
    // ---- reads ----

    /// Tag for `steam_id`, or an empty string if it was never set.
    #[must_use]
    pub fn get(&self, steam_id: i64) -> String {
        self.map.get(steam_id).unwrap_or_default()
    }

    /// Tag for `steam_id`, or `None` if absent.
    #[must_use]
    pub fn lookup(&self, steam_id: i64) -> Option<String> {
        self.map.get(steam_id)
    }

    /// `true` if the id has an entry.
    #[must_use]
    pub fn contains(&self, steam_id: i64) -> bool {
        self.map.contains_key(steam_id)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.map_len()
    }

    /// `true` when the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries.
    #[must_use]
    pub fn entries(&self) -> HashMap<i64, String> {
        self.map.snapshot()
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.persister.path()
    }

    // ---- writes ----

    /// Associate `tag` with `steam_id`, overwriting any previous tag.
    ///
    /// The in-memory map is updated before this returns. Persistence happens
    /// later on the worker thread; failures there are logged, not returned.
    pub fn set(&self, steam_id: i64, tag: impl Into<String>) {
        self.map.insert(steam_id, tag.into());
        flush::trigger(&self.trigger);
    }

    // ---- persistence ----

    /// Run a persistence pass on the calling thread and wait for it.
    /// Serialized with background passes through the persistence lock.
    pub fn flush(&self) -> Result<()> {
        self.persister.pass(self.map.as_ref()).map(|_| ())
    }
}

impl<M> std::fmt::Debug for TagStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagStore")
            .field("path", &self.persister.path())
            .field("serializer", self.persister.serializer())
            .finish_non_exhaustive()
    }
}

fn background_pass<M: MapBackend>(map: &M, persister: &Persister) {
    match persister.pass(map) {
        Ok(entries) => debug!(path = %persister.path().display(), entries, "persisted store"),
        Err(e) => error!(path = %persister.path().display(), error = %e, "persistence pass failed"),
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`TagStore`].
///
/// ```rust,no_run
/// use tag_registry::TagStore;
///
/// let store = TagStore::builder("storage.json")
///     .pretty(true)
///     .build()
///     .unwrap();
/// store.set(76561198000000000, "Alice#1234");
/// ```
pub struct TagStoreBuilder<M = DefaultBackend> {
    path: PathBuf,
    pretty: bool,
    _marker: std::marker::PhantomData<M>,
}

impl<M> TagStoreBuilder<M>
where
    M: MapBackend + Default + 'static,
{
    /// Builder for a store at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Write human-readable JSON with indentation (default: compact).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Load the file (if any), start the persistence worker, and return a
    /// handle. This is the only synchronous disk read the store performs.
    pub fn build(self) -> Result<TagStoreHandle<M>> {
        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };

        let map = Arc::new(M::default());
        let data = load(&self.path, &serializer)?;
        let loaded = data.len();
        for (k, v) in data {
            map.insert(k, v);
        }
        info!(path = %self.path.display(), entries = loaded, "opened tag store");

        let persister = Arc::new(Persister::new(self.path, serializer));
        let (worker, trigger) = {
            let map = Arc::clone(&map);
            let persister = Arc::clone(&persister);
            PersistWorker::start(move || background_pass(map.as_ref(), &persister))?
        };

        let store = TagStore {
            map,
            persister,
            trigger,
        };

        Ok(TagStoreHandle {
            inner: store,
            worker: Some(worker),
        })
    }
}

impl<M> std::fmt::Debug for TagStoreBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagStoreBuilder")
            .field("path", &self.path)
            .field("pretty", &self.pretty)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owns the store and its persistence thread.
///
/// Derefs to [`TagStore`] so you can call store methods directly on it.
/// Share it between threads behind an `Arc`. Dropping it closes the trigger
/// channel and joins the worker, which first finishes any pass still queued.
pub struct TagStoreHandle<M = DefaultBackend> {
    // Field order matters: the store (and with it the trigger) must drop
    // before the worker is joined.
    pub(crate) inner: TagStore<M>,
    pub(crate) worker: Option<PersistWorker>,
}

impl<M> std::ops::Deref for TagStoreHandle<M> {
    type Target = TagStore<M>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<M> std::fmt::Debug for TagStoreHandle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagStoreHandle")
            .field("store", &self.inner)
            .field("worker", &self.worker)
            .finish()
    }
}
