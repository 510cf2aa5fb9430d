//! Task storage for taskcal.
//!
//! Tasks hang off calendar days. The whole `date -> [task]` mapping is
//! serialized into one storage slot after every mutation:
//!
//! ```json
//! { "2025-03-15": [ { "text": "Buy milk", "done": false } ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::date_key::DateKey;
use crate::error::{Error, Result};
use crate::storage::{SnapshotStorage, TASKS_SLOT};

/// A single free-text task. Its identity is its position in the day's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub text: String,
    pub done: bool,
}

impl Task {
    fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

/// Completed/uncompleted counts for some span of days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayCounts {
    pub completed: usize,
    pub uncompleted: usize,
}

impl DayCounts {
    pub fn of(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.done).count();
        Self {
            completed,
            uncompleted: tasks.len() - completed,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.uncompleted
    }

    pub fn add(&mut self, other: DayCounts) {
        self.completed += other.completed;
        self.uncompleted += other.uncompleted;
    }
}

/// Mapping from day to its ordered task list.
///
/// Never holds a key with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskMap {
    days: BTreeMap<DateKey, Vec<Task>>,
}

impl TaskMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks for `key`, empty if the day has none.
    pub fn list_for(&self, key: &DateKey) -> &[Task] {
        self.days.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn counts_for(&self, key: &DateKey) -> DayCounts {
        DayCounts::of(self.list_for(key))
    }

    pub fn contains(&self, key: &DateKey) -> bool {
        self.days.contains_key(key)
    }

    /// Days holding at least one task, oldest first.
    pub fn dates(&self) -> impl Iterator<Item = &DateKey> + '_ {
        self.days.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &[Task])> + '_ {
        self.days.iter().map(|(key, tasks)| (key, tasks.as_slice()))
    }

    /// Number of days holding tasks.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn task_total(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Parse a snapshot, dropping entries that break the map invariants.
    ///
    /// Returns the map and the number of discarded keys or tasks.
    fn from_snapshot(raw: &str) -> Result<(Self, usize)> {
        let parsed: BTreeMap<String, Vec<Task>> = serde_json::from_str(raw)?;
        let mut days = BTreeMap::new();
        let mut dropped = 0;

        for (raw_key, tasks) in parsed {
            let key = match DateKey::parse(&raw_key) {
                Ok(key) => key,
                Err(_) => {
                    dropped += 1;
                    continue;
                }
            };
            let before = tasks.len();
            let tasks: Vec<Task> = tasks
                .into_iter()
                .filter(|task| !task.text.trim().is_empty())
                .collect();
            dropped += before - tasks.len();
            if tasks.is_empty() {
                dropped += 1;
                continue;
            }
            days.insert(key, tasks);
        }

        Ok((Self { days }, dropped))
    }
}

/// Owns the task mapping and mirrors it into a storage slot.
#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
    slot: String,
    tasks: TaskMap,
}

impl<S: SnapshotStorage> TaskStore<S> {
    /// Empty store over `storage`; call [`TaskStore::load`] to rehydrate.
    pub fn new(storage: S) -> Self {
        Self::with_slot(storage, TASKS_SLOT)
    }

    pub fn with_slot(storage: S, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
            tasks: TaskMap::new(),
        }
    }

    /// Construct and load in one step.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.load();
        store
    }

    pub fn open_with_slot(storage: S, slot: impl Into<String>) -> Self {
        let mut store = Self::with_slot(storage, slot);
        store.load();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Read-only view of all tasks.
    pub fn tasks(&self) -> &TaskMap {
        &self.tasks
    }

    pub fn list_for(&self, key: &DateKey) -> &[Task] {
        self.tasks.list_for(key)
    }

    /// Replace the mapping with the stored snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot yields an empty mapping.
    pub fn load(&mut self) {
        let raw = match self.storage.read(&self.slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(slot = %self.slot, "no snapshot stored; starting empty");
                self.tasks = TaskMap::new();
                return;
            }
            Err(err) => {
                warn!(slot = %self.slot, error = %err, "snapshot unreadable; starting empty");
                self.tasks = TaskMap::new();
                return;
            }
        };

        match TaskMap::from_snapshot(&raw) {
            Ok((tasks, dropped)) => {
                if dropped > 0 {
                    warn!(slot = %self.slot, dropped, "discarded invalid snapshot entries");
                }
                debug!(
                    slot = %self.slot,
                    days = tasks.len(),
                    tasks = tasks.task_total(),
                    "loaded snapshot"
                );
                self.tasks = tasks;
            }
            Err(err) => {
                warn!(slot = %self.slot, error = %err, "snapshot corrupt; starting empty");
                self.tasks = TaskMap::new();
            }
        }
    }

    /// Serialize the whole mapping into the slot.
    pub fn persist(&mut self) -> Result<()> {
        let json = self.snapshot_json()?;
        self.storage.write(&self.slot, &json)?;
        debug!(slot = %self.slot, bytes = json.len(), "persisted snapshot");
        Ok(())
    }

    /// The snapshot as it would be persisted.
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.tasks)?)
    }

    /// Append a task to `key`. Returns its position.
    pub fn add(&mut self, key: &DateKey, text: &str) -> Result<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyTask);
        }

        let list = self.tasks.days.entry(*key).or_default();
        list.push(Task::new(text));
        let index = list.len() - 1;
        debug!(date = %key, index, "added task");

        self.persist()?;
        Ok(index)
    }

    /// Flip the done flag of the task at `index`. Returns the new state.
    pub fn toggle(&mut self, key: &DateKey, index: usize) -> Result<bool> {
        let len = self.tasks.list_for(key).len();
        let Some(task) = self
            .tasks
            .days
            .get_mut(key)
            .and_then(|list| list.get_mut(index))
        else {
            return Err(out_of_range(key, index, len));
        };
        task.done = !task.done;
        let done = task.done;
        debug!(date = %key, index, done, "toggled task");

        self.persist()?;
        Ok(done)
    }

    /// Remove the task at `index`, pruning the day when it empties.
    pub fn remove(&mut self, key: &DateKey, index: usize) -> Result<Task> {
        let len = self.tasks.list_for(key).len();
        if index >= len {
            return Err(out_of_range(key, index, len));
        }

        let Some(list) = self.tasks.days.get_mut(key) else {
            return Err(out_of_range(key, index, len));
        };
        let removed = list.remove(index);
        if list.is_empty() {
            self.tasks.days.remove(key);
        }
        debug!(date = %key, index, "removed task");

        self.persist()?;
        Ok(removed)
    }
}

fn out_of_range(key: &DateKey, index: usize, len: usize) -> Error {
    Error::IndexOutOfRange {
        key: key.to_string(),
        index,
        len,
    }
}
