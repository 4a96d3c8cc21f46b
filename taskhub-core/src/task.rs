//! Task entity and its embedded checklist.
//!
//! A task is owned by its `creator` and may additionally be visible to
//! `assignees` and `shared_with` users (see [`crate::visibility`]). Sharing
//! mutations (`share_with` / `unshare`) are pure set operations here; the
//! creator-only rule is enforced by the query predicate the caller scopes
//! the update with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::user::UserId;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a checklist item within a task.
///
/// Item identity is stable across completion toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChecklistItemId(Uuid);

impl ChecklistItemId {
    /// Creates a new checklist item identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `ChecklistItemId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ChecklistItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChecklistItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChecklistItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Needs attention first.
    High,
    /// Default urgency.
    Moderate,
    /// Can wait.
    Low,
}

impl Priority {
    /// Parses a wire token (`HIGH`, `MODERATE`, `LOW`).
    ///
    /// Returns `None` for anything else; the caller turns that into a
    /// validation error.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "HIGH" => Some(Self::High),
            "MODERATE" => Some(Self::Moderate),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

/// Task workflow column.
///
/// There is no transition graph: any visible party may write any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Not yet scheduled.
    Backlog,
    /// Scheduled, not started.
    Todo,
    /// Actively being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl Status {
    /// Parses a wire token (`BACKLOG`, `TODO`, `IN_PROGRESS`, `DONE`).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "BACKLOG" => Some(Self::Backlog),
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Todo
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backlog => write!(f, "BACKLOG"),
            Self::Todo => write!(f, "TODO"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// A single checklist entry embedded in a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Stable item identifier.
    pub id: ChecklistItemId,
    /// Item text, non-empty.
    pub text: String,
    /// Completion flag, toggled by any visible party.
    #[serde(default)]
    pub is_completed: bool,
}

impl ChecklistItem {
    /// Creates a new, uncompleted checklist item with a fresh id.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ChecklistItemId::new(),
            text: text.into(),
            is_completed: false,
        }
    }
}

/// A task document.
///
/// `creator` is immutable after creation and is the sole owner for sharing
/// grants and revokes. `assignees` and `shared_with` carry set semantics:
/// order is preserved for display but membership is what matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier (UUID v7, time-ordered).
    pub id: TaskId,
    /// Task title, non-empty.
    pub title: String,
    /// Priority level, required at creation.
    pub priority: Priority,
    /// Workflow column, defaults to `TODO`.
    #[serde(default)]
    pub status: Status,
    /// Optional due instant. `None` means the task is due "whenever" and
    /// is included by every date-window filter.
    pub due_date: Option<DateTime<Utc>>,
    /// Embedded checklist, possibly empty.
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Users assigned to work on the task.
    #[serde(default)]
    pub assignees: Vec<UserId>,
    /// The owning user, set at creation from the authenticated caller.
    pub creator: UserId,
    /// Users granted read/update visibility by the creator.
    #[serde(default)]
    pub shared_with: Vec<UserId>,
    /// UI collapse flag for the board column rendering.
    #[serde(default)]
    pub collapsed: bool,
    /// Stamped by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Stamped by the store on every write.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Flips the completion flag of the checklist item with the given id.
    ///
    /// Item identity is stable, so applying this twice restores the
    /// original completion state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if no item has that id.
    pub fn toggle_item(&mut self, item_id: ChecklistItemId) -> Result<(), DomainError> {
        let item = self
            .checklist
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(DomainError::NotFound("Checklist item"))?;
        item.is_completed = !item.is_completed;
        Ok(())
    }

    /// Adds users to `shared_with` as a set union.
    ///
    /// Users already present (or appearing twice in the input) are added
    /// once; re-sharing is a no-op, not an error.
    pub fn share_with(&mut self, user_ids: &[UserId]) {
        for user_id in user_ids {
            if !self.shared_with.contains(user_id) {
                self.shared_with.push(*user_id);
            }
        }
    }

    /// Removes a single user from `shared_with`.
    ///
    /// Removing a non-member is a no-op.
    pub fn unshare(&mut self, user_id: UserId) {
        self.shared_with.retain(|id| *id != user_id);
    }
}
