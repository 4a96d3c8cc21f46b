//! Task query and mutation engines.
//!
//! Every operation is scoped by the acting user's visibility predicate
//! (ownership predicate for sharing), so an unauthorized caller gets the
//! same "Task not found" signal as a caller naming a task that does not
//! exist. Read responses resolve user references to display projections;
//! a dangling reference becomes `null` instead of failing the response.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use taskhub_core::error::DomainError;
use taskhub_core::query;
use taskhub_core::task::{
    ChecklistItem, ChecklistItemId, Priority, Status, Task, TaskId,
};
use taskhub_core::user::{UserId, UserProjection};
use taskhub_core::visibility;
use taskhub_core::window::Period;

use crate::directory::UserDirectory;
use crate::store::TaskStore;

/// A checklist entry supplied at task creation.
#[derive(Debug, Clone)]
pub struct NewChecklistEntry {
    /// Item text, non-empty.
    pub text: String,
    /// Initial completion state.
    pub is_completed: bool,
}

/// Input for creating a task. `title` and `priority` are required but kept
/// optional here so their absence surfaces as a validation error rather
/// than a deserialization failure.
#[derive(Debug, Clone, Default)]
pub struct CreateTask {
    /// Task title.
    pub title: Option<String>,
    /// Priority wire token (`HIGH`, `MODERATE`, `LOW`).
    pub priority: Option<String>,
    /// Optional due instant.
    pub due_date: Option<DateTime<Utc>>,
    /// Initial checklist entries.
    pub checklist: Vec<NewChecklistEntry>,
    /// Assigned users.
    pub assignees: Vec<UserId>,
}

/// A task response with user references resolved to projections.
///
/// An entry is `None` when the referenced user no longer exists in the
/// directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Priority level.
    pub priority: Priority,
    /// Workflow column.
    pub status: Status,
    /// Optional due instant.
    pub due_date: Option<DateTime<Utc>>,
    /// Embedded checklist.
    pub checklist: Vec<ChecklistItem>,
    /// Resolved assignees.
    pub assignees: Vec<Option<UserProjection>>,
    /// Resolved creator.
    pub creator: Option<UserProjection>,
    /// Resolved shared-with users.
    pub shared_with: Vec<Option<UserProjection>>,
    /// UI collapse flag.
    pub collapsed: bool,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last write instant.
    pub updated_at: DateTime<Utc>,
}

/// Authorization-scoped task operations over the store.
pub struct TaskService {
    store: TaskStore,
    directory: Arc<UserDirectory>,
}

impl TaskService {
    /// Creates a service with an empty store.
    #[must_use]
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self {
            store: TaskStore::new(),
            directory,
        }
    }

    /// Creates a task owned by the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the title is missing or
    /// empty, the priority token is missing or unknown, or a checklist
    /// entry has empty text.
    pub async fn create(
        &self,
        acting_user: UserId,
        input: CreateTask,
    ) -> Result<TaskView, DomainError> {
        let (title, priority) = validate_create(&input)?;

        let checklist = input
            .checklist
            .into_iter()
            .map(|entry| {
                let mut item = ChecklistItem::new(entry.text);
                item.is_completed = entry.is_completed;
                item
            })
            .collect();

        let mut assignees = Vec::new();
        for assignee in input.assignees {
            if !assignees.contains(&assignee) {
                assignees.push(assignee);
            }
        }

        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            title,
            priority,
            status: Status::default(),
            due_date: input.due_date,
            checklist,
            assignees,
            creator: acting_user,
            shared_with: vec![],
            collapsed: false,
            created_at: now,
            updated_at: now,
        };

        let stored = self.store.insert(task).await?;
        tracing::info!(task_id = %stored.id, creator = %acting_user, "task created");
        Ok(self.resolve(stored))
    }

    /// Lists tasks visible to the user, newest first.
    ///
    /// `filter_token` is the raw `filter` query value; unrecognized or
    /// absent tokens mean no date filtering. Tasks without a due date are
    /// included under every filter.
    pub async fn list(&self, acting_user: UserId, filter_token: Option<&str>) -> Vec<TaskView> {
        let period = filter_token.and_then(Period::parse);
        let predicate = query::visible_tasks(acting_user, period, Utc::now());

        let mut tasks = self.store.find_matching(&predicate).await;
        query::sort_newest_first(&mut tasks);
        tracing::debug!(user = %acting_user, count = tasks.len(), ?period, "listed tasks");
        tasks.into_iter().map(|task| self.resolve(task)).collect()
    }

    /// Writes a new status on a visible task.
    ///
    /// # Errors
    ///
    /// [`DomainError::Validation`] for an unknown status token;
    /// [`DomainError::NotFound`] when the task is absent or not visible.
    pub async fn change_status(
        &self,
        acting_user: UserId,
        task_id: TaskId,
        status_token: &str,
    ) -> Result<TaskView, DomainError> {
        let status = Status::parse(status_token).ok_or_else(|| {
            DomainError::invalid("status must be one of BACKLOG, TODO, IN_PROGRESS, DONE")
        })?;

        let updated = self
            .store
            .update_one(task_id, &visibility::visible_to(acting_user), |task| {
                task.status = status;
                Ok(())
            })
            .await
            .inspect_err(|_| {
                tracing::warn!(task_id = %task_id, user = %acting_user, "status change rejected");
            })?;
        Ok(self.resolve(updated))
    }

    /// Flips a checklist item's completion flag on a visible task.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] for a missing/invisible task (`"Task"`)
    /// or a missing item (`"Checklist item"`).
    pub async fn toggle_checklist(
        &self,
        acting_user: UserId,
        task_id: TaskId,
        item_id: ChecklistItemId,
    ) -> Result<TaskView, DomainError> {
        let updated = self
            .store
            .update_one(task_id, &visibility::visible_to(acting_user), |task| {
                task.toggle_item(item_id)
            })
            .await
            .inspect_err(|_| {
                tracing::warn!(task_id = %task_id, user = %acting_user, "checklist toggle rejected");
            })?;
        Ok(self.resolve(updated))
    }

    /// Grants visibility to additional users. Creator only; a non-creator
    /// receives the same not-found signal as for an absent task.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] when the task is absent or the acting
    /// user is not its creator.
    pub async fn share(
        &self,
        acting_user: UserId,
        task_id: TaskId,
        user_ids: Vec<UserId>,
    ) -> Result<TaskView, DomainError> {
        let updated = self
            .store
            .update_one(task_id, &visibility::owned_by(acting_user), |task| {
                task.share_with(&user_ids);
                Ok(())
            })
            .await
            .inspect_err(|_| {
                tracing::warn!(task_id = %task_id, user = %acting_user, "share rejected");
            })?;
        tracing::info!(task_id = %task_id, creator = %acting_user, "task shared");
        Ok(self.resolve(updated))
    }

    /// Revokes one user's shared visibility. Creator only; removing a
    /// non-member is a no-op returning the unchanged task.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] when the task is absent or the acting
    /// user is not its creator.
    pub async fn unshare(
        &self,
        acting_user: UserId,
        task_id: TaskId,
        target: UserId,
    ) -> Result<TaskView, DomainError> {
        let updated = self
            .store
            .update_one(task_id, &visibility::owned_by(acting_user), |task| {
                task.unshare(target);
                Ok(())
            })
            .await
            .inspect_err(|_| {
                tracing::warn!(task_id = %task_id, user = %acting_user, "unshare rejected");
            })?;
        Ok(self.resolve(updated))
    }

    /// Sets the UI collapse flag on a visible task.
    ///
    /// # Errors
    ///
    /// [`DomainError::NotFound`] when the task is absent or not visible.
    pub async fn set_collapsed(
        &self,
        acting_user: UserId,
        task_id: TaskId,
        collapsed: bool,
    ) -> Result<TaskView, DomainError> {
        let updated = self
            .store
            .update_one(task_id, &visibility::visible_to(acting_user), |task| {
                task.collapsed = collapsed;
                Ok(())
            })
            .await
            .inspect_err(|_| {
                tracing::warn!(task_id = %task_id, user = %acting_user, "collapse change rejected");
            })?;
        Ok(self.resolve(updated))
    }

    /// Resolves user references to projections for one task.
    fn resolve(&self, task: Task) -> TaskView {
        TaskView {
            id: task.id,
            title: task.title,
            priority: task.priority,
            status: task.status,
            due_date: task.due_date,
            checklist: task.checklist,
            assignees: task
                .assignees
                .iter()
                .map(|id| self.directory.projection(*id))
                .collect(),
            creator: self.directory.projection(task.creator),
            shared_with: task
                .shared_with
                .iter()
                .map(|id| self.directory.projection(*id))
                .collect(),
            collapsed: task.collapsed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Validates creation input, returning the required fields.
fn validate_create(input: &CreateTask) -> Result<(String, Priority), DomainError> {
    let mut errors = Vec::new();

    let title = input.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        errors.push("title is required".to_string());
    }

    let priority = match input.priority.as_deref() {
        None | Some("") => {
            errors.push("priority is required".to_string());
            None
        }
        Some(token) => {
            let parsed = Priority::parse(token);
            if parsed.is_none() {
                errors.push("priority must be one of HIGH, MODERATE, LOW".to_string());
            }
            parsed
        }
    };

    for entry in &input.checklist {
        if entry.text.trim().is_empty() {
            errors.push("checklist item text is required".to_string());
        }
    }

    match (priority, errors.is_empty()) {
        (Some(priority), true) => Ok((title.to_string(), priority)),
        _ => Err(DomainError::Validation { errors }),
    }
}
