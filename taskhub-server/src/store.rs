//! In-memory task document store.
//!
//! The [`TaskStore`] holds every task in a single map guarded by an
//! [`RwLock`]. All mutations go through [`TaskStore::update_one`], which
//! runs the read-modify-write under the write lock and commits the new
//! document only if the mutator succeeds — a failing mutation leaves the
//! stored document untouched, so concurrent checklist toggles or sharing
//! updates can never observe a partial write.

use std::collections::HashMap;

use chrono::Utc;
use taskhub_core::error::DomainError;
use taskhub_core::query::Predicate;
use taskhub_core::task::{Task, TaskId};
use tokio::sync::RwLock;

/// Thread-safe in-memory collection of task documents.
#[derive(Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
}

impl TaskStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new task, stamping `created_at` and `updated_at`.
    ///
    /// Returns the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Conflict`] if a task with the same id
    /// already exists.
    pub async fn insert(&self, mut task: Task) -> Result<Task, DomainError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(DomainError::Conflict { field: "id" });
        }
        let now = Utc::now();
        task.created_at = now;
        task.updated_at = now;
        tasks.insert(task.id, task.clone());
        drop(tasks);
        Ok(task)
    }

    /// Returns all tasks matching the predicate, in unspecified order.
    pub async fn find_matching(&self, predicate: &Predicate) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        tasks
            .values()
            .filter(|task| predicate.matches(task))
            .cloned()
            .collect()
    }

    /// Returns the task with the given id if it matches the predicate.
    ///
    /// An existing task that fails the predicate is indistinguishable from
    /// an absent one.
    pub async fn find_one(&self, id: TaskId, predicate: &Predicate) -> Option<Task> {
        let tasks = self.tasks.read().await;
        tasks
            .get(&id)
            .filter(|task| predicate.matches(task))
            .cloned()
    }

    /// Applies a mutation to the task with the given id, scoped by the
    /// predicate, as one atomic document update.
    ///
    /// The mutator runs against a draft copy under the write lock; the
    /// draft replaces the stored document (with a fresh `updated_at`) only
    /// when the mutator returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] (`"Task"`) when the task is
    /// absent or fails the predicate, or the mutator's error unchanged.
    pub async fn update_one<F>(
        &self,
        id: TaskId,
        predicate: &Predicate,
        mutate: F,
    ) -> Result<Task, DomainError>
    where
        F: FnOnce(&mut Task) -> Result<(), DomainError>,
    {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&id)
            .filter(|task| predicate.matches(task))
            .ok_or(DomainError::NotFound("Task"))?;

        let mut draft = task.clone();
        mutate(&mut draft)?;
        draft.updated_at = Utc::now();
        *task = draft.clone();
        drop(tasks);
        Ok(draft)
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` when the store holds no tasks.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}
