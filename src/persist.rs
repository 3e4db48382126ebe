//! Disk I/O: load at startup, and serialized persistence passes.
//!
//! Writes go to `<path>.tmp` and are renamed over the target, so a crash
//! mid-write leaves the previous file intact. On FAT32 or network shares the
//! rename carries no hard guarantees.

use crate::backend::MapBackend;
use crate::error::{Error, Result};
use crate::serializer::JsonSerializer;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Reads and decodes the file at `path`. A missing file is an empty map; any
/// other read failure is [`Error::Io`], bad contents are [`Error::Format`].
pub fn load(path: &Path, serializer: &JsonSerializer) -> Result<HashMap<i64, String>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(Error::Io(e.to_string())),
    };
    serializer.deserialize(&bytes)
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. The temp file
/// is removed again if the rename fails.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Owns the target path and the persistence lock.
///
/// Every pass holds the lock across snapshot, serialize, and write, so passes
/// are totally ordered and a stale snapshot can never land after a fresher
/// one. The map lock is only taken inside [`MapBackend::snapshot`].
#[derive(Debug)]
pub struct Persister {
    path: PathBuf,
    serializer: JsonSerializer,
    pub(crate) lock: Mutex<()>,
}

impl Persister {
    /// Persister writing to `path` with the given encoding.
    pub fn new(path: PathBuf, serializer: JsonSerializer) -> Self {
        Self {
            path,
            serializer,
            lock: Mutex::new(()),
        }
    }

    /// Target file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding used for passes.
    pub fn serializer(&self) -> &JsonSerializer {
        &self.serializer
    }

    /// One persistence pass: write the latest state of `map` to disk.
    /// Returns the number of entries written.
    pub fn pass<M: MapBackend + ?Sized>(&self, map: &M) -> Result<usize> {
        let _guard = self.lock.lock();
        let data = map.snapshot();
        let bytes = self.serializer.serialize(&data)?;
        atomic_write(&self.path, &bytes)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "tag_registry_persist_{}_{}.json",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn load_missing_file_is_empty() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        assert!(load(&path, &JsonSerializer::new()).unwrap().is_empty());
    }

    #[test]
    fn load_directory_is_io_error() {
        let dir = std::env::temp_dir();
        match load(&dir, &JsonSerializer::new()) {
            Err(Error::Io(_)) => {}
            other => panic!("expected i/o error, got {other:?}"),
        }
    }

    #[test]
    fn pass_writes_snapshot_and_leaves_no_tmp() {
        let path = temp_path("pass");
        let _ = std::fs::remove_file(&path);
        let map = RwLock::new(HashMap::from([(5_i64, "five".to_string())]));
        let persister = Persister::new(path.clone(), JsonSerializer::new());

        assert_eq!(persister.pass(&map).unwrap(), 1);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, r#"{"5":"five"}"#);
        assert!(!path.with_extension("json.tmp").exists());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn failed_rename_removes_tmp_file() {
        // a directory at the target path makes the rename fail
        let path = temp_path("rename_fails");
        let _ = std::fs::remove_file(&path);
        std::fs::create_dir_all(&path).unwrap();

        assert!(matches!(atomic_write(&path, b"{}"), Err(Error::Io(_))));
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.is_dir());
        let _ = std::fs::remove_dir(&path);
    }

    #[test]
    fn pass_into_missing_directory_fails_with_io() {
        let path = std::env::temp_dir()
            .join("tag_registry_no_such_dir")
            .join("store.json");
        let map = RwLock::new(HashMap::new());
        let persister = Persister::new(path, JsonSerializer::new());
        assert!(matches!(persister.pass(&map), Err(Error::Io(_))));
    }
}
