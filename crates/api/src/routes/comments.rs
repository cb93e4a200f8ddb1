//! Task comment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::middleware::AuthUser;
use crate::AppState;
use sdx_db::{CommentRepository, TaskRepository};

/// Creates the comments router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks/{task_id}/comments", get(list_comments))
        .route("/tasks/{task_id}/comments", post(create_comment))
        .route("/comments/{comment_id}", patch(update_comment))
        .route(
            "/comments/{comment_id}",
            axum::routing::delete(delete_comment),
        )
}

/// Request payload for creating or editing a comment.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// Comment text.
    pub body: String,
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

fn comment_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Comment not found"
        })),
    )
        .into_response()
}

/// GET `/tasks/{task_id}/comments` - List the live comments on a task.
async fn list_comments(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = CommentRepository::new((*state.db).clone());

    match repo.list_for_task(task_id).await {
        Ok(comments) => (StatusCode::OK, Json(json!({ "comments": comments }))).into_response(),
        Err(e) => {
            error!(error = %e, "Database error listing comments");
            internal_error()
        }
    }
}

/// POST `/tasks/{task_id}/comments` - Comment on a task.
async fn create_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
    Json(payload): Json<CommentRequest>,
) -> impl IntoResponse {
    if payload.body.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Comment body must not be empty"
            })),
        )
            .into_response();
    }

    let task_repo = TaskRepository::new((*state.db).clone());
    match task_repo.find_by_id(task_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Task not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error fetching task");
            return internal_error();
        }
    }

    let repo = CommentRepository::new((*state.db).clone());
    match repo
        .create(task_id, auth.user_id(), payload.body.trim())
        .await
    {
        Ok(comment) => {
            info!(comment_id = %comment.id, %task_id, "Comment created");
            (StatusCode::CREATED, Json(comment)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create comment");
            internal_error()
        }
    }
}

/// PATCH `/comments/{comment_id}` - Edit an own comment.
async fn update_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<uuid::Uuid>,
    Json(payload): Json<CommentRequest>,
) -> impl IntoResponse {
    if payload.body.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Comment body must not be empty"
            })),
        )
            .into_response();
    }

    let repo = CommentRepository::new((*state.db).clone());

    let comment = match repo.find_by_id(comment_id).await {
        Ok(Some(c)) if !c.is_deleted => c,
        Ok(_) => return comment_not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching comment");
            return internal_error();
        }
    };

    if comment.author_id != auth.user_id() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Only the author can edit a comment"
            })),
        )
            .into_response();
    }

    match repo.update_body(comment_id, payload.body.trim()).await {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to edit comment");
            internal_error()
        }
    }
}

/// DELETE `/comments/{comment_id}` - Soft-delete an own comment (admins
/// may delete any).
async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(comment_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = CommentRepository::new((*state.db).clone());

    let comment = match repo.find_by_id(comment_id).await {
        Ok(Some(c)) if !c.is_deleted => c,
        Ok(_) => return comment_not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching comment");
            return internal_error();
        }
    };

    if comment.author_id != auth.user_id() && !auth.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Only the author can delete a comment"
            })),
        )
            .into_response();
    }

    match repo.soft_delete(comment_id).await {
        Ok(()) => {
            info!(%comment_id, "Comment deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete comment");
            internal_error()
        }
    }
}
