//! HTTP server core: shared state, bearer authentication, route handlers,
//! and the domain-error-to-response mapping.
//!
//! Handlers are thin: they authenticate the caller, parse path/body
//! input, and delegate to the [`TaskService`]. Every domain error is
//! translated to a JSON `{message}` body at this boundary, so a failing
//! request never escapes as an unhandled error.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use taskhub_core::error::DomainError;
use taskhub_core::task::{ChecklistItemId, TaskId};
use taskhub_core::user::{UserId, UserProjection};

use crate::directory::UserDirectory;
use crate::service::{CreateTask, NewChecklistEntry, TaskService, TaskView};

/// Shared server state: the task service and the user directory.
pub struct AppState {
    /// Authorization-scoped task operations.
    pub service: TaskService,
    /// User directory, also used for token resolution.
    pub directory: Arc<UserDirectory>,
}

impl AppState {
    /// Creates server state over a directory, with an empty task store.
    #[must_use]
    pub fn new(directory: Arc<UserDirectory>) -> Self {
        Self {
            service: TaskService::new(Arc::clone(&directory)),
            directory,
        }
    }
}

/// An HTTP-level error: a status code plus the JSON body to send.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    /// 401 for missing or unresolvable bearer credentials.
    #[must_use]
    pub fn authentication_failed() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: json!({ "message": "Authentication failed" }),
        }
    }

    /// Returns the HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { errors } => Self {
                status: StatusCode::BAD_REQUEST,
                body: json!({ "message": "Validation Error", "errors": errors }),
            },
            DomainError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                body: json!({ "message": err.to_string() }),
            },
            DomainError::Conflict { field } => Self {
                status: StatusCode::CONFLICT,
                body: json!({ "message": "Duplicate field value entered", "field": field }),
            },
            DomainError::Unexpected(ref detail) => {
                tracing::error!(error = %detail, "unexpected domain error");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: json!({ "message": "Internal server error" }),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Rejects with 401 when the header is missing, not a bearer scheme, or
/// the token does not resolve to a directory user.
#[derive(Debug)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token.and_then(|t| state.directory.resolve_token(t)) {
            Some(user_id) => Ok(Self(user_id)),
            None => {
                tracing::warn!("authentication failed");
                Err(ApiError::authentication_failed())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Request bodies and query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CreateTaskRequest {
    title: Option<String>,
    priority: Option<String>,
    /// RFC 3339 timestamp; empty string means no due date.
    due_date: Option<String>,
    checklist: Vec<ChecklistEntryRequest>,
    assignees: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChecklistEntryRequest {
    text: String,
    #[serde(default)]
    is_completed: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusRequest {
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ShareRequest {
    user_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CollapseRequest {
    collapsed: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskListQuery {
    filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserSearchQuery {
    query: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskView>), ApiError> {
    let due_date = parse_due_date(body.due_date.as_deref())?;
    let assignees = parse_user_ids(&body.assignees, "assignees must be valid user ids")?;

    let input = CreateTask {
        title: body.title,
        priority: body.priority,
        due_date,
        checklist: body
            .checklist
            .into_iter()
            .map(|entry| NewChecklistEntry {
                text: entry.text,
                is_completed: entry.is_completed,
            })
            .collect(),
        assignees,
    };

    let view = state.service.create(user_id, input).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<TaskListQuery>,
) -> Json<Vec<TaskView>> {
    Json(state.service.list(user_id, params.filter.as_deref()).await)
}

async fn change_status(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let status = body.status.unwrap_or_default();
    let view = state.service.change_status(user_id, task_id, &status).await?;
    Ok(Json(view))
}

async fn toggle_checklist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<TaskView>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let item_id: ChecklistItemId = item_id
        .parse()
        .map_err(|_| ApiError::from(DomainError::NotFound("Checklist item")))?;
    let view = state.service.toggle_checklist(user_id, task_id, item_id).await?;
    Ok(Json(view))
}

async fn share_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ShareRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let targets = parse_user_ids(&body.user_ids, "userIds must be valid user ids")?;
    let view = state.service.share(user_id, task_id, targets).await?;
    Ok(Json(view))
}

async fn unshare_task(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((id, target)): Path<(String, String)>,
) -> Result<Json<TaskView>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let target: UserId = target
        .parse()
        .map_err(|_| ApiError::from(DomainError::NotFound("User")))?;
    let view = state.service.unshare(user_id, task_id, target).await?;
    Ok(Json(view))
}

async fn set_collapsed(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(body): Json<CollapseRequest>,
) -> Result<Json<TaskView>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let collapsed = body
        .collapsed
        .ok_or_else(|| ApiError::from(DomainError::invalid("collapsed is required")))?;
    let view = state.service.set_collapsed(user_id, task_id, collapsed).await?;
    Ok(Json(view))
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(_): AuthUser,
    Query(params): Query<UserSearchQuery>,
) -> Json<Vec<UserProjection>> {
    let users = match params.query.as_deref() {
        Some(query) => state.directory.search(query),
        None => state.directory.list(),
    };
    Json(users)
}

async fn route_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

/// A malformed task id in the path is indistinguishable from an absent task.
fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::from(DomainError::NotFound("Task")))
}

/// Parses a list of wire user ids, rejecting the request when any is
/// malformed.
fn parse_user_ids(raw: &[String], message: &str) -> Result<Vec<UserId>, ApiError> {
    raw.iter()
        .map(|value| value.parse::<UserId>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ApiError::from(DomainError::invalid(message)))
}

/// Parses the `dueDate` field; empty strings mean "no due date".
fn parse_due_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .parse::<DateTime<Utc>>()
            .map(Some)
            .map_err(|_| {
                ApiError::from(DomainError::invalid("dueDate must be an RFC 3339 timestamp"))
            }),
    }
}

// ---------------------------------------------------------------------------
// Router and server startup
// ---------------------------------------------------------------------------

/// Builds the API router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tasks", post(create_task).get(list_tasks))
        .route("/api/tasks/{id}/status", patch(change_status))
        .route("/api/tasks/{id}/checklist/{item_id}", patch(toggle_checklist))
        .route("/api/tasks/{id}/share", post(share_task))
        .route("/api/tasks/{id}/share/{user_id}", delete(unshare_task))
        .route("/api/tasks/{id}/collapse", patch(set_collapsed))
        .route("/api/users", get(list_users))
        .fallback(route_not_found)
        .with_state(state)
}

/// Starts the server on the given address and returns the bound address
/// and a join handle.
///
/// This is the primary entry point used by both `main.rs` and test code.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server error");
        }
    });

    Ok((bound_addr, handle))
}
