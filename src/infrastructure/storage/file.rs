//! File storage backend
//!
//! One `<key>.json` file per key inside a data directory. Writes go to a
//! sibling temp file which is then renamed over the target, so a reader
//! sees either the old or the new collection, never a torn one.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicU64, Ordering};
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::StorageBackend;
use crate::shared::errors::InfraError;

pub struct FileBackend {
    dir: PathBuf,
    /// What this process last did per key: `Some(fingerprint)` for a
    /// write, `None` for a removal.
    written: DashMap<String, Option<String>>,
    /// Suffix source for temp files, unique per write within the process.
    tmp_seq: AtomicU64,
}

impl FileBackend {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, InfraError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        info!(path = %dir.display(), "Opened file storage");
        Ok(Self {
            dir,
            written: DashMap::new(),
            tmp_seq: AtomicU64::new(0),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, InfraError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(InfraError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    pub fn fingerprint(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    /// Fingerprint of the key's current on-disk content, `None` if absent.
    pub fn current_fingerprint(&self, key: &str) -> Result<Option<String>, InfraError> {
        match std::fs::read(self.path_for(key)?) {
            Ok(bytes) => Ok(Some(Self::fingerprint(&bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// State of `key` as this process last left it, or `None` if this
    /// process never touched it.
    pub fn last_written(&self, key: &str) -> Option<Option<String>> {
        self.written.get(key).map(|f| f.clone())
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, InfraError> {
        match std::fs::read_to_string(self.path_for(key)?) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), InfraError> {
        let path = self.path_for(key)?;
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!("{key}.json.{}.{seq}.tmp", std::process::id()));

        std::fs::write(&tmp, value)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        self.written
            .insert(key.to_string(), Some(Self::fingerprint(value.as_bytes())));
        debug!(key, bytes = value.len(), "Wrote collection file");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), InfraError> {
        match std::fs::remove_file(self.path_for(key)?) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.written.insert(key.to_string(), None);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path().join("data")).unwrap();

        assert_eq!(backend.get_item("task_tracker_users").unwrap(), None);
        backend.set_item("task_tracker_users", "[]").unwrap();
        assert_eq!(backend.get_item("task_tracker_users").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("data/task_tracker_users.json").exists());

        backend.remove_item("task_tracker_users").unwrap();
        backend.remove_item("task_tracker_users").unwrap();
        assert_eq!(backend.get_item("task_tracker_users").unwrap(), None);
    }

    #[test]
    fn concurrent_writes_to_one_key_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let backend = std::sync::Arc::new(FileBackend::open(dir.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let backend = backend.clone();
                std::thread::spawn(move || {
                    for j in 0..25 {
                        backend
                            .set_item("task_tracker_current_user", &format!("{{\"n\":{}}}", i * 100 + j))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = backend.get_item("task_tracker_current_user").unwrap().unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&stored).is_ok());
        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| e.as_ref().unwrap().path().extension().is_some_and(|x| x == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        for key in ["../escape", "a/b", "", ".hidden"] {
            assert!(matches!(backend.set_item(key, "[]"), Err(InfraError::InvalidKey(_))));
        }
    }

    #[test]
    fn tracks_own_writes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        backend.set_item("k", "[1]").unwrap();

        let on_disk = backend.current_fingerprint("k").unwrap();
        assert_eq!(backend.last_written("k"), Some(on_disk));
        assert_eq!(backend.last_written("untouched"), None);

        std::fs::write(dir.path().join("k.json"), "[2]").unwrap();
        let changed = backend.current_fingerprint("k").unwrap();
        assert_ne!(backend.last_written("k"), Some(changed));

        backend.remove_item("k").unwrap();
        assert_eq!(backend.last_written("k"), Some(None));
    }
}
