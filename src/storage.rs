use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::Task;

/// Key of the slot holding the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

/// A string key/value store with the shape of browser local storage.
pub trait Storage {
    /// Returns the value stored under `key`, or `None` if absent or unreadable.
    fn get_item(&self, key: &str) -> Option<String>;
    /// Overwrites the value stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
    /// Deletes `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> FileStorage {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let path = self.slot_path(key);
        let mut f = match OpenOptions::new().read(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open storage slot");
                return None;
            }
        };
        let mut s = String::new();
        if let Err(e) = f.read_to_string(&mut s) {
            warn!(path = %path.display(), error = %e, "failed to read storage slot");
            return None;
        }
        Some(s)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(self.slot_path(key))?;
        f.write_all(value.as_bytes())?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-process storage; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// Reads and writes the whole task collection under [`TASKS_KEY`].
#[derive(Debug, Clone)]
pub struct TaskStorage<S> {
    backend: S,
}

impl<S: Storage> TaskStorage<S> {
    pub fn new(backend: S) -> TaskStorage<S> {
        TaskStorage { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Loads all tasks.
    ///
    /// Returns an empty vector if nothing was saved yet or the stored text
    /// is not a task array.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.backend.get_item(TASKS_KEY) {
            Some(raw) => raw,
            None => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "stored tasks are malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Serializes `tasks` and overwrites the stored collection.
    pub fn save(&mut self, tasks: &[Task]) -> Result<()> {
        let s = serde_json::to_string_pretty(tasks)?;
        self.backend.set_item(TASKS_KEY, &s)?;
        debug!(count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Removes the stored collection entirely.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.remove_item(TASKS_KEY)
    }
}
