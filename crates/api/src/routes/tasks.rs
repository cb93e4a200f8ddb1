//! Task management routes, including subtasks.

use axum::http::HeaderMap;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::middleware::AuthUser;
use crate::routes::client_meta;
use crate::routes::projects::parse_priority;
use crate::AppState;
use sdx_core::task as task_rules;
use sdx_db::entities::sea_orm_active_enums::{NotificationKind, Priority, TaskStatus};
use sdx_db::repositories::{
    CreateNotificationInput, CreateTaskInput, RecordAuditInput, TaskError, TaskFilter,
    UpdateTaskInput,
};
use sdx_db::{AuditRepository, NotificationRepository, TaskRepository};
use sdx_shared::types::{PageRequest, PageResponse};

/// Creates the tasks router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/projects/{project_id}/tasks", post(create_task))
        .route("/tasks/{task_id}", get(get_task))
        .route("/tasks/{task_id}", patch(update_task))
        .route("/tasks/{task_id}", axum::routing::delete(delete_task))
}

/// Request payload for creating a task.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Status label (defaults to todo).
    pub status: Option<String>,
    /// Priority label (defaults to medium).
    pub priority: Option<String>,
    /// Progress (0-100); implied by the status when omitted.
    pub progress: Option<i32>,
    /// Assigned user.
    pub assignee_id: Option<uuid::Uuid>,
    /// Parent task for subtasks.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Estimated hours.
    pub estimated_hours: Option<Decimal>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Comma-separated labels.
    pub labels: Option<String>,
}

/// Request payload for updating a task.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// Task name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Status label.
    pub status: Option<String>,
    /// Priority label.
    pub priority: Option<String>,
    /// Progress (0-100).
    pub progress: Option<i32>,
    /// Assigned user (inner `None` clears the assignment).
    pub assignee_id: Option<Option<uuid::Uuid>>,
    /// Parent task.
    pub parent_task_id: Option<uuid::Uuid>,
    /// Estimated hours.
    pub estimated_hours: Option<Decimal>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Comma-separated labels.
    pub labels: Option<String>,
}

/// Query parameters for listing tasks.
#[derive(Debug, Deserialize)]
struct ListTasksQuery {
    project_id: Option<uuid::Uuid>,
    status: Option<String>,
    priority: Option<String>,
    assignee_id: Option<uuid::Uuid>,
    #[serde(default)]
    overdue_only: bool,
    search: Option<String>,
}

/// Parses a status label through the domain vocabulary into the column enum.
fn parse_task_status(status: &str) -> Option<TaskStatus> {
    task_rules::TaskStatus::parse(status).map(from_rules_status)
}

const fn to_rules_status(status: TaskStatus) -> task_rules::TaskStatus {
    match status {
        TaskStatus::Todo => task_rules::TaskStatus::Todo,
        TaskStatus::InProgress => task_rules::TaskStatus::InProgress,
        TaskStatus::Testing => task_rules::TaskStatus::Testing,
        TaskStatus::Done => task_rules::TaskStatus::Done,
        TaskStatus::Blocked => task_rules::TaskStatus::Blocked,
    }
}

const fn from_rules_status(status: task_rules::TaskStatus) -> TaskStatus {
    match status {
        task_rules::TaskStatus::Todo => TaskStatus::Todo,
        task_rules::TaskStatus::InProgress => TaskStatus::InProgress,
        task_rules::TaskStatus::Testing => TaskStatus::Testing,
        task_rules::TaskStatus::Done => TaskStatus::Done,
        task_rules::TaskStatus::Blocked => TaskStatus::Blocked,
    }
}

fn validation_error(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": message
        })),
    )
        .into_response()
}

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Task not found"
        })),
    )
        .into_response()
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}

async fn notify_assignee(state: &AppState, assignee: uuid::Uuid, task_name: &str) {
    let _ = NotificationRepository::new((*state.db).clone())
        .create(CreateNotificationInput {
            user_id: assignee,
            kind: NotificationKind::Task,
            title: "Task assigned to you".to_string(),
            body: format!("You were assigned the task \"{task_name}\""),
            priority: Priority::Medium,
        })
        .await;
}

/// GET /tasks - List tasks with filters.
async fn list_tasks(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListTasksQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(parse_task_status) {
        Some(None) => return validation_error("Unknown task status"),
        other => other.flatten(),
    };
    let priority = match query.priority.as_deref().map(parse_priority) {
        Some(None) => return validation_error("Unknown priority"),
        other => other.flatten(),
    };

    let page = page.clamped();
    let repo = TaskRepository::new((*state.db).clone());

    match repo
        .list(
            TaskFilter {
                project_id: query.project_id,
                status,
                priority,
                assignee_id: query.assignee_id,
                overdue_only: query.overdue_only,
                search: query.search,
            },
            page.offset(),
            page.limit(),
        )
        .await
    {
        Ok((rows, total)) => (
            StatusCode::OK,
            Json(PageResponse::new(rows, page.page, page.per_page, total)),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error listing tasks");
            internal_error()
        }
    }
}

/// POST `/projects/{project_id}/tasks` - Create a task (viewer excluded).
#[allow(clippy::too_many_lines)]
async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
    headers: HeaderMap,
    Json(payload): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    if !auth.has_role("user") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Viewers cannot create tasks"
            })),
        )
            .into_response();
    }

    if task_rules::validate_name(&payload.name).is_err() {
        return validation_error("Task name must be 2-100 characters");
    }
    if task_rules::validate_dates(payload.start_date, payload.due_date).is_err() {
        return validation_error("Due date must not be before start date");
    }

    let status = match payload.status.as_deref() {
        None => TaskStatus::Todo,
        Some(s) => match parse_task_status(s) {
            Some(s) => s,
            None => return validation_error("Unknown task status"),
        },
    };
    let priority = match payload.priority.as_deref() {
        None => Priority::Medium,
        Some(p) => match parse_priority(p) {
            Some(p) => p,
            None => return validation_error("Unknown priority"),
        },
    };

    // An explicit progress wins; otherwise the status implies it
    let progress = match payload.progress {
        Some(progress) => {
            if task_rules::validate_progress(progress).is_err() {
                return validation_error("Progress must be between 0 and 100");
            }
            progress
        }
        None => task_rules::progress_for_status(to_rules_status(status)).unwrap_or(0),
    };

    let repo = TaskRepository::new((*state.db).clone());
    let task = match repo
        .create(CreateTaskInput {
            project_id,
            name: payload.name,
            description: payload.description,
            status,
            priority,
            progress,
            assignee_id: payload.assignee_id,
            reporter_id: auth.user_id(),
            parent_task_id: payload.parent_task_id,
            estimated_hours: payload.estimated_hours,
            start_date: payload.start_date,
            due_date: payload.due_date,
            labels: payload.labels,
        })
        .await
    {
        Ok(t) => t,
        Err(TaskError::ProjectNotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Project not found"
                })),
            )
                .into_response();
        }
        Err(TaskError::ParentNotFound(_)) => {
            return validation_error("Parent task not found");
        }
        Err(TaskError::ParentWrongProject) => {
            return validation_error("Parent task belongs to a different project");
        }
        Err(e) => {
            error!(error = %e, "Failed to create task");
            return internal_error();
        }
    };

    if let Some(assignee) = task.assignee_id
        && assignee != auth.user_id()
    {
        notify_assignee(&state, assignee, &task.name).await;
    }

    let (ip_address, user_agent) = client_meta(&headers);
    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: auth.user_id(),
            project_id: Some(project_id),
            task_id: Some(task.id),
            action: "task.created".to_string(),
            details: Some(task.name.clone()),
            ip_address,
            user_agent,
        })
        .await;

    info!(task_id = %task.id, %project_id, "Task created");

    (StatusCode::CREATED, Json(task)).into_response()
}

/// GET `/tasks/{task_id}` - Get a task with its direct subtasks.
async fn get_task(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = TaskRepository::new((*state.db).clone());

    let task = match repo.find_by_id(task_id).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching task");
            return internal_error();
        }
    };

    let subtasks = match repo.subtasks(task_id).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Database error fetching subtasks");
            return internal_error();
        }
    };

    (
        StatusCode::OK,
        Json(json!({ "task": task, "subtasks": subtasks })),
    )
        .into_response()
}

/// PATCH `/tasks/{task_id}` - Update a task.
///
/// Status and progress move together: a status change implies a progress
/// value and vice versa, unless both are given explicitly.
#[allow(clippy::too_many_lines)]
async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    if !auth.has_role("user") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Viewers cannot update tasks"
            })),
        )
            .into_response();
    }

    if let Some(name) = payload.name.as_deref()
        && task_rules::validate_name(name).is_err()
    {
        return validation_error("Task name must be 2-100 characters");
    }

    let mut status = match payload.status.as_deref().map(parse_task_status) {
        Some(None) => return validation_error("Unknown task status"),
        other => other.flatten(),
    };
    let priority = match payload.priority.as_deref().map(parse_priority) {
        Some(None) => return validation_error("Unknown priority"),
        other => other.flatten(),
    };

    let mut progress = payload.progress;
    if let Some(p) = progress
        && task_rules::validate_progress(p).is_err()
    {
        return validation_error("Progress must be between 0 and 100");
    }

    // Couple status and progress when only one of them was supplied
    match (status, progress) {
        (Some(s), None) => {
            progress = task_rules::progress_for_status(to_rules_status(s));
        }
        (None, Some(p)) => {
            status = Some(from_rules_status(task_rules::status_for_progress(p)));
        }
        _ => {}
    }

    let repo = TaskRepository::new((*state.db).clone());

    // Track assignee changes for notification
    let previous = match repo.find_by_id(task_id).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching task");
            return internal_error();
        }
    };

    let input = UpdateTaskInput {
        name: payload.name,
        description: payload.description.map(Some),
        status,
        priority,
        progress,
        assignee_id: payload.assignee_id,
        parent_task_id: payload.parent_task_id.map(Some),
        estimated_hours: payload.estimated_hours.map(Some),
        start_date: payload.start_date.map(Some),
        due_date: payload.due_date.map(Some),
        labels: payload.labels.map(Some),
    };

    let task = match repo.update(task_id, input).await {
        Ok(t) => t,
        Err(TaskError::TaskNotFound(_)) => return not_found(),
        Err(TaskError::ParentNotFound(_)) => {
            return validation_error("Parent task not found");
        }
        Err(TaskError::ParentWrongProject) => {
            return validation_error("Parent task belongs to a different project");
        }
        Err(TaskError::ParentIsSelf) => {
            return validation_error("A task cannot be its own parent");
        }
        Err(e) => {
            error!(error = %e, "Failed to update task");
            return internal_error();
        }
    };

    if let Some(assignee) = task.assignee_id
        && previous.assignee_id != Some(assignee)
        && assignee != auth.user_id()
    {
        notify_assignee(&state, assignee, &task.name).await;
    }

    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: auth.user_id(),
            project_id: Some(task.project_id),
            task_id: Some(task.id),
            action: "task.updated".to_string(),
            details: None,
            ip_address: None,
            user_agent: None,
        })
        .await;

    info!(task_id = %task.id, "Task updated");

    (StatusCode::OK, Json(task)).into_response()
}

/// DELETE `/tasks/{task_id}` - Delete a task (manager or admin).
async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.has_role("manager") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Manager role required to delete tasks"
            })),
        )
            .into_response();
    }

    let repo = TaskRepository::new((*state.db).clone());

    let task = match repo.find_by_id(task_id).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching task");
            return internal_error();
        }
    };

    match repo.delete(task_id).await {
        Ok(true) => {
            let _ = AuditRepository::new((*state.db).clone())
                .record(RecordAuditInput {
                    user_id: auth.user_id(),
                    project_id: Some(task.project_id),
                    task_id: Some(task_id),
                    action: "task.deleted".to_string(),
                    details: Some(task.name),
                    ip_address: None,
                    user_agent: None,
                })
                .await;

            info!(%task_id, "Task deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to delete task");
            internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("todo", Some(TaskStatus::Todo))]
    #[case("DONE", Some(TaskStatus::Done))]
    #[case("blocked", Some(TaskStatus::Blocked))]
    #[case("cancelled", None)]
    fn test_parse_task_status(#[case] input: &str, #[case] expected: Option<TaskStatus>) {
        assert_eq!(parse_task_status(input), expected);
    }

    #[rstest]
    #[case(TaskStatus::Todo)]
    #[case(TaskStatus::InProgress)]
    #[case(TaskStatus::Testing)]
    #[case(TaskStatus::Done)]
    #[case(TaskStatus::Blocked)]
    fn test_status_conversion_round_trip(#[case] status: TaskStatus) {
        assert_eq!(from_rules_status(to_rules_status(status)), status);
    }
}
