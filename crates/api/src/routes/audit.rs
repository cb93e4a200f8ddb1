//! Audit log query routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::middleware::AuthUser;
use crate::AppState;
use sdx_db::AuditRepository;
use sdx_db::repositories::AuditFilter;
use sdx_shared::types::{PageRequest, PageResponse};

/// Creates the audit router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/audit-logs", get(list_audit_logs))
}

/// Query parameters for the audit log.
#[derive(Debug, Deserialize)]
struct AuditQuery {
    user_id: Option<uuid::Uuid>,
    project_id: Option<uuid::Uuid>,
    action: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

/// GET /audit-logs - Query the audit trail (admin only).
async fn list_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<AuditQuery>,
) -> impl IntoResponse {
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

    let page = page.clamped();
    let repo = AuditRepository::new((*state.db).clone());

    match repo
        .list(
            AuditFilter {
                user_id: query.user_id,
                project_id: query.project_id,
                action: query.action,
                from: query.from,
                to: query.to,
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
            error!(error = %e, "Database error querying audit log");
            crate::routes::error_response(&sdx_shared::AppError::Database(e.to_string()))
        }
    }
}
