//! Notification routes, including the due-task sweep.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::middleware::AuthUser;
use crate::AppState;
use sdx_db::entities::sea_orm_active_enums::{NotificationKind, Priority};
use sdx_db::repositories::{CreateNotificationInput, DueTask};
use sdx_db::{NotificationRepository, TaskRepository};
use sdx_shared::types::{PageRequest, PageResponse};

/// Creates the notifications router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/{notification_id}/read", post(mark_read))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/sweep-due", post(sweep_due_tasks))
}

/// Query parameters for listing notifications.
#[derive(Debug, Deserialize)]
struct ListNotificationsQuery {
    #[serde(default)]
    unread_only: bool,
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

/// GET /notifications - List own notifications, newest first.
async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListNotificationsQuery>,
) -> impl IntoResponse {
    let page = page.clamped();
    let repo = NotificationRepository::new((*state.db).clone());

    match repo
        .list_for_user(auth.user_id(), query.unread_only, page.offset(), page.limit())
        .await
    {
        Ok((rows, total)) => (
            StatusCode::OK,
            Json(PageResponse::new(rows, page.page, page.per_page, total)),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error listing notifications");
            internal_error()
        }
    }
}

/// GET /notifications/unread-count - Count own unread notifications.
async fn unread_count(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.unread_count(auth.user_id()).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread": count }))).into_response(),
        Err(e) => {
            error!(error = %e, "Database error counting notifications");
            internal_error()
        }
    }
}

/// POST `/notifications/{notification_id}/read` - Mark one as read.
async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.mark_read(notification_id, auth.user_id()).await {
        Ok(true) => (StatusCode::OK, Json(json!({ "read": true }))).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Notification not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to mark notification read");
            internal_error()
        }
    }
}

/// POST /notifications/read-all - Mark all own notifications as read.
async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.mark_all_read(auth.user_id()).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "marked": count }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to mark notifications read");
            internal_error()
        }
    }
}

fn due_soon_notification(due: &DueTask, assignee: uuid::Uuid) -> CreateNotificationInput {
    CreateNotificationInput {
        user_id: assignee,
        kind: NotificationKind::Task,
        title: "Task due soon".to_string(),
        body: format!(
            "\"{}\" in {} is due within 24 hours",
            due.task.name, due.project_name
        ),
        priority: due.task.priority,
    }
}

fn overdue_notification(due: &DueTask, assignee: uuid::Uuid) -> CreateNotificationInput {
    CreateNotificationInput {
        user_id: assignee,
        kind: NotificationKind::Task,
        title: "Task overdue".to_string(),
        body: format!("\"{}\" in {} is past its due date", due.task.name, due.project_name),
        priority: Priority::High,
    }
}

/// POST /notifications/sweep-due - Notify assignees of tasks due within
/// 24 hours and of overdue tasks (admin only).
async fn sweep_due_tasks(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if !auth.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Administrator role required"
            })),
        )
            .into_response();
    }

    let task_repo = TaskRepository::new((*state.db).clone());
    let notification_repo = NotificationRepository::new((*state.db).clone());

    let due_soon = match task_repo.due_soon(1).await {
        Ok(tasks) => tasks,
        Err(e) => {
            error!(error = %e, "Database error finding due tasks");
            return internal_error();
        }
    };

    let overdue = match task_repo.overdue().await {
        Ok(tasks) => tasks,
        Err(e) => {
            error!(error = %e, "Database error finding overdue tasks");
            return internal_error();
        }
    };

    let mut created = 0u64;

    for due in &due_soon {
        if let Some(assignee) = due.task.assignee_id {
            match notification_repo.create(due_soon_notification(due, assignee)).await {
                Ok(_) => created += 1,
                Err(e) => error!(error = %e, "Failed to create due-soon notification"),
            }
        }
    }

    for due in &overdue {
        if let Some(assignee) = due.task.assignee_id {
            match notification_repo.create(overdue_notification(due, assignee)).await {
                Ok(_) => created += 1,
                Err(e) => error!(error = %e, "Failed to create overdue notification"),
            }
        }
    }

    info!(
        due_soon = due_soon.len(),
        overdue = overdue.len(),
        created,
        "Due-task sweep finished"
    );

    (
        StatusCode::OK,
        Json(json!({
            "due_soon": due_soon.len(),
            "overdue": overdue.len(),
            "notifications_created": created
        })),
    )
        .into_response()
}
