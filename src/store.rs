//! Crash-safe persistence of the canonical task file.
//!
//! A save holds the advisory lock, writes the whole document to a sibling
//! temporary file, fsyncs it and renames it over the target. Readers never
//! take the lock: they see either the old file or the new one, never a mix.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::codec;
use crate::error::{CodecError, Result};
use crate::lock::FileLock;
use crate::model::Task;

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LOCK_RETRY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Total time a save waits for the lock before giving up.
    pub lock_timeout: Duration,
    /// Pause between attempts to create the lock marker.
    pub lock_retry: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            lock_retry: DEFAULT_LOCK_RETRY,
        }
    }
}

/// Handle to a JSON task file on disk.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    config: StoreConfig,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_config(path, StoreConfig::default())
    }

    pub fn with_config(path: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Missing or empty file loads as an empty collection. Does not lock.
    pub fn load(&self) -> Result<Vec<Task>> {
        Ok(codec::load_json(&self.path)?)
    }

    /// Replace the file's content with `tasks`, all or nothing.
    pub fn save(&self, tasks: &[Task]) -> Result<()> {
        let _lock = FileLock::acquire(&self.path, self.config.lock_timeout, self.config.lock_retry)?;
        let bytes = codec::encode_json(tasks)?;
        self.replace_contents(&bytes)?;
        info!(count = tasks.len(), path = %self.path.display(), "saved tasks to JSON");
        Ok(())
    }

    /// Temp file in the target's directory so the final rename never crosses
    /// filesystems. If anything fails before the rename, dropping the
    /// `NamedTempFile` deletes it.
    fn replace_contents(&self, bytes: &[u8]) -> Result<(), CodecError> {
        let write_err = |source| CodecError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "tasks".to_string());

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{file_name}.tmp."))
            .tempfile_in(dir)
            .map_err(write_err)?;
        debug!(tmp = %tmp.path().display(), "writing temporary file");

        tmp.write_all(bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Load the task file at `path`.
pub fn load(path: &Path) -> Result<Vec<Task>> {
    JsonStore::new(path).load()
}

/// Save `tasks` to `path` with the default lock settings.
pub fn save(path: &Path, tasks: &[Task]) -> Result<()> {
    JsonStore::new(path).save(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lock::lock_path;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: 1,
                description: "Test task 1".to_string(),
                done: false,
            },
            Task {
                id: 2,
                description: "Test task 2".to_string(),
                done: true,
            },
        ]
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n.contains(".tmp.") || n.ends_with(".lock"))
            .collect()
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("tasks.json"));
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::new(dir.path().join("tasks.json"));
        store.save(&sample()).unwrap();
        store.save(&sample()[..1]).unwrap();
        assert_eq!(store.load().unwrap(), sample()[..1].to_vec());
    }

    #[test]
    fn save_empty_collection_writes_empty_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        save(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_missing_and_empty_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        assert!(load(&path).unwrap().is_empty());
        fs::write(&path, b"").unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, b"not json").unwrap();
        assert!(matches!(load(&path).unwrap_err(), Error::Codec(_)));
    }

    #[test]
    fn lock_timeout_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        save(&path, &sample()).unwrap();
        let before = fs::read(&path).unwrap();

        fs::write(lock_path(&path), b"").unwrap();
        let store = JsonStore::with_config(
            &path,
            StoreConfig {
                lock_timeout: Duration::from_millis(100),
                lock_retry: Duration::from_millis(10),
            },
        );
        let err = store.save(&[]).unwrap_err();
        assert!(matches!(err, Error::LockTimeout { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);
        // The marker belongs to someone else and must survive.
        assert!(lock_path(&path).exists());
    }

    #[test]
    fn failed_rename_cleans_up() {
        let dir = TempDir::new().unwrap();
        // A directory in the target's place makes the final rename fail.
        let path = dir.path().join("tasks.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = save(&path, &sample()).unwrap_err();
        assert!(matches!(err, Error::Codec(CodecError::Write { .. })));
        assert!(path.is_dir());
        assert!(path.join("keep").exists());
        assert!(leftovers(dir.path()).is_empty());
    }
}
