//! Time tracking routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::middleware::AuthUser;
use crate::AppState;
use sdx_core::task::duration_hours;
use sdx_db::repositories::CreateTimeEntryInput;
use sdx_db::{TaskRepository, TimeEntryRepository};

/// Creates the time tracking router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks/{task_id}/time-entries", get(list_for_task))
        .route("/tasks/{task_id}/time-entries", post(create_entry))
        .route("/time-entries/mine", get(list_mine))
        .route(
            "/time-entries/{entry_id}",
            axum::routing::delete(delete_entry),
        )
}

/// Request payload for logging time.
#[derive(Debug, Deserialize)]
pub struct CreateTimeEntryRequest {
    /// When the work started.
    pub started_at: DateTime<Utc>,
    /// When the work ended; used to derive the duration when no explicit
    /// duration is given.
    pub ended_at: Option<DateTime<Utc>>,
    /// Duration in hours; wins over the start/end pair.
    pub duration: Option<Decimal>,
    /// What was done.
    pub description: Option<String>,
    /// Calendar day the work belongs to (defaults to the start date).
    pub entry_date: Option<NaiveDate>,
    /// Whether the time is billable (defaults to true).
    pub is_billable: Option<bool>,
}

/// Query parameters for listing own entries.
#[derive(Debug, Deserialize)]
struct ListMineQuery {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
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

/// POST `/tasks/{task_id}/time-entries` - Log time against a task.
async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
    Json(payload): Json<CreateTimeEntryRequest>,
) -> impl IntoResponse {
    if !auth.has_role("user") {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Viewers cannot log time"
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

    let duration = match (payload.duration, payload.ended_at) {
        (Some(d), _) => d,
        (None, Some(ended_at)) => duration_hours(payload.started_at, ended_at),
        (None, None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": "Either a duration or an end time is required"
                })),
            )
                .into_response();
        }
    };

    if duration <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Duration must be positive"
            })),
        )
            .into_response();
    }

    let repo = TimeEntryRepository::new((*state.db).clone());
    match repo
        .create(CreateTimeEntryInput {
            task_id,
            user_id: auth.user_id(),
            started_at: payload.started_at,
            ended_at: payload.ended_at,
            duration,
            description: payload.description,
            entry_date: payload
                .entry_date
                .unwrap_or_else(|| payload.started_at.date_naive()),
            is_billable: payload.is_billable.unwrap_or(true),
        })
        .await
    {
        Ok(entry) => {
            info!(entry_id = %entry.id, %task_id, "Time entry logged");
            (StatusCode::CREATED, Json(entry)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to log time entry");
            internal_error()
        }
    }
}

/// GET `/tasks/{task_id}/time-entries` - List a task's time entries.
async fn list_for_task(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(task_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = TimeEntryRepository::new((*state.db).clone());

    match repo.list_for_task(task_id).await {
        Ok(entries) => (StatusCode::OK, Json(json!({ "entries": entries }))).into_response(),
        Err(e) => {
            error!(error = %e, "Database error listing time entries");
            internal_error()
        }
    }
}

/// GET /time-entries/mine - List the authenticated user's entries.
async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListMineQuery>,
) -> impl IntoResponse {
    let repo = TimeEntryRepository::new((*state.db).clone());

    match repo
        .list_for_user(auth.user_id(), query.from, query.to)
        .await
    {
        Ok(entries) => {
            let total_hours: Decimal = entries.iter().map(|e| e.duration).sum();
            (
                StatusCode::OK,
                Json(json!({ "entries": entries, "total_hours": total_hours })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing time entries");
            internal_error()
        }
    }
}

/// DELETE `/time-entries/{entry_id}` - Delete an own entry (admins may
/// delete any).
async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = TimeEntryRepository::new((*state.db).clone());

    let entry = match repo.find_by_id(entry_id).await {
        Ok(Some(e)) => e,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "Time entry not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error fetching time entry");
            return internal_error();
        }
    };

    if entry.user_id != auth.user_id() && !auth.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "You can only delete your own time entries"
            })),
        )
            .into_response();
    }

    match repo.delete(entry_id).await {
        Ok(_) => {
            info!(%entry_id, "Time entry deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete time entry");
            internal_error()
        }
    }
}
