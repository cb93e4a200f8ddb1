//! Dashboard and reporting routes over the SQL views.

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::error;

use crate::middleware::AuthUser;
use crate::routes::error_response;
use crate::AppState;
use sdx_core::workload::WorkloadLevel;
use sdx_db::ReportRepository;
use sdx_shared::AppError;

/// Creates the dashboard router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/reports/project-summary", get(project_summary))
        .route("/reports/user-workload", get(user_workload))
}

fn internal_error() -> axum::response::Response {
    error_response(&AppError::Internal("An error occurred".to_string()))
}

/// GET /dashboard - Headline counters for the landing view.
async fn dashboard(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());

    let summaries = match repo.project_summaries().await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, "Database error loading project summaries");
            return internal_error();
        }
    };

    let mut projects_by_status: BTreeMap<String, u64> = BTreeMap::new();
    let mut total_tasks = 0i64;
    let mut done_tasks = 0i64;
    let mut in_progress_tasks = 0i64;
    let mut overdue_tasks = 0i64;
    let mut logged_hours = Decimal::ZERO;

    for row in &summaries {
        *projects_by_status.entry(row.status.clone()).or_default() += 1;
        total_tasks += row.total_tasks;
        done_tasks += row.done_tasks;
        in_progress_tasks += row.in_progress_tasks;
        overdue_tasks += row.overdue_tasks;
        logged_hours += row.logged_hours;
    }

    (
        StatusCode::OK,
        Json(json!({
            "total_projects": summaries.len(),
            "projects_by_status": projects_by_status,
            "tasks": {
                "total": total_tasks,
                "done": done_tasks,
                "in_progress": in_progress_tasks,
                "overdue": overdue_tasks
            },
            "logged_hours": logged_hours
        })),
    )
        .into_response()
}

/// GET /reports/project-summary - One row per project with aggregates.
async fn project_summary(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());

    match repo.project_summaries().await {
        Ok(rows) => (StatusCode::OK, Json(json!({ "projects": rows }))).into_response(),
        Err(e) => {
            error!(error = %e, "Database error loading project summaries");
            internal_error()
        }
    }
}

/// GET /reports/user-workload - Open work per active user with a
/// workload level classification.
async fn user_workload(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());

    match repo.user_workloads().await {
        Ok(rows) => {
            let data: Vec<_> = rows
                .into_iter()
                .map(|row| {
                    let level =
                        WorkloadLevel::from_open_tasks(u64::try_from(row.open_tasks).unwrap_or(0));
                    json!({
                        "id": row.id,
                        "username": row.username,
                        "first_name": row.first_name,
                        "last_name": row.last_name,
                        "department": row.department,
                        "open_tasks": row.open_tasks,
                        "overdue_tasks": row.overdue_tasks,
                        "done_tasks": row.done_tasks,
                        "hours_this_month": row.hours_this_month,
                        "workload_level": level
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "users": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error loading user workloads");
            internal_error()
        }
    }
}
