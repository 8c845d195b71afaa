use chrono::Local;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Task, NewTask, DEFAULT_CATEGORY};
use crate::storage::{Storage, TaskStorage};

/// Owns the in-memory task list and writes every change through to storage.
///
/// Every mutating operation first reloads from storage, so edits made by
/// another process since the last call are picked up rather than overwritten.
pub struct TaskStore<S> {
    storage: TaskStorage<S>,
    tasks: Vec<Task>,
    last_id: u64,
}

impl<S: Storage> TaskStore<S> {
    /// Creates a store and loads the persisted collection.
    pub fn new(backend: S) -> TaskStore<S> {
        let storage = TaskStorage::new(backend);
        let tasks = storage.load();
        TaskStore { storage, tasks, last_id: 0 }
    }

    /// Replaces the in-memory list with what is currently persisted.
    pub fn reload(&mut self) -> &[Task] {
        self.tasks = self.storage.load();
        &self.tasks
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn storage(&self) -> &TaskStorage<S> {
        &self.storage
    }

    /// Distinct categories across all tasks, in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for t in &self.tasks {
            if !seen.contains(&t.category) {
                seen.push(t.category.clone());
            }
        }
        seen
    }

    /// Appends a new pending task and persists the collection.
    pub fn add(&mut self, fields: NewTask) -> Result<Task> {
        self.reload();
        let id = self.next_id()?;
        let task = Task {
            id,
            name: fields.name,
            description: fields.description,
            deadline: fields.deadline,
            priority: fields.priority,
            completed: false,
            category: DEFAULT_CATEGORY.to_string(),
        };
        self.tasks.push(task.clone());
        self.persist()?;
        self.last_id = id;
        info!(id, name = %task.name, "task added");
        Ok(task)
    }

    /// Flips the completion flag of task `id`. Unknown ids change nothing.
    pub fn toggle_completion(&mut self, id: u64) -> Result<()> {
        self.reload();
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.completed = !t.completed;
                info!(id, completed = t.completed, "task toggled");
            }
            None => debug!(id, "toggle for unknown task ignored"),
        }
        self.persist()
    }

    /// Removes task `id`. Unknown ids change nothing.
    pub fn delete(&mut self, id: u64) -> Result<()> {
        self.reload();
        let len_before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == len_before {
            debug!(id, "delete for unknown task ignored");
        } else {
            info!(id, "task deleted");
        }
        self.persist()
    }

    /// Deletes every stored task.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.tasks.clear();
        info!("task list reset");
        Ok(())
    }

    // Writes the list through. On failure the in-memory list falls back to
    // what storage still holds.
    fn persist(&mut self) -> Result<()> {
        if let Err(e) = self.storage.save(&self.tasks) {
            self.tasks = self.storage.load();
            return Err(e);
        }
        Ok(())
    }

    // Creation time in ms, bumped past every id already issued or stored.
    fn next_id(&self) -> Result<u64> {
        let now = Local::now().timestamp_millis().max(0) as u64;
        let highest = self.tasks.iter().map(|t| t.id).max().unwrap_or(0).max(self.last_id);
        let next = highest.checked_add(1).ok_or(Error::IdsExhausted)?;
        Ok(now.max(next))
    }
}
