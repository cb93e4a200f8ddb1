//! Project management routes, including membership.

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
use crate::AppState;
use sdx_db::entities::sea_orm_active_enums::{NotificationKind, Priority, ProjectStatus};
use sdx_db::repositories::{
    AddMemberInput, CreateNotificationInput, CreateProjectInput, MemberError, ProjectFilter,
    RecordAuditInput, UpdateMemberInput, UpdateProjectInput,
};
use sdx_db::{AuditRepository, MemberRepository, NotificationRepository, ProjectRepository};
use sdx_shared::types::{PageRequest, PageResponse};

/// Creates the projects router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects", post(create_project))
        .route("/projects/{project_id}", get(get_project))
        .route("/projects/{project_id}", patch(update_project))
        .route("/projects/{project_id}", axum::routing::delete(delete_project))
        .route("/projects/{project_id}/stats", get(project_stats))
        .route("/projects/{project_id}/recompute", post(recompute_completion))
        .route("/projects/{project_id}/members", get(list_members))
        .route("/projects/{project_id}/members", post(add_member))
        .route(
            "/projects/{project_id}/members/{user_id}",
            patch(update_member),
        )
        .route(
            "/projects/{project_id}/members/{user_id}",
            axum::routing::delete(remove_member),
        )
}

/// Request payload for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Status label (defaults to planning).
    pub status: Option<String>,
    /// Priority label (defaults to medium).
    pub priority: Option<String>,
    /// Planned budget.
    pub budget: Option<Decimal>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Estimated total hours.
    pub estimated_hours: Option<Decimal>,
    /// Client name.
    pub client_name: Option<String>,
    /// Owning manager.
    pub manager_id: Option<uuid::Uuid>,
}

/// Request payload for updating a project.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// Project name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Status label.
    pub status: Option<String>,
    /// Priority label.
    pub priority: Option<String>,
    /// Planned budget.
    pub budget: Option<Decimal>,
    /// Money spent so far.
    pub actual_cost: Option<Decimal>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// End date.
    pub end_date: Option<NaiveDate>,
    /// Estimated total hours.
    pub estimated_hours: Option<Decimal>,
    /// Client name.
    pub client_name: Option<String>,
    /// Owning manager.
    pub manager_id: Option<uuid::Uuid>,
}

/// Query parameters for listing projects.
#[derive(Debug, Deserialize)]
struct ListProjectsQuery {
    status: Option<String>,
    priority: Option<String>,
    manager_id: Option<uuid::Uuid>,
    search: Option<String>,
}

/// Request payload for adding a member.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add.
    pub user_id: uuid::Uuid,
    /// Role label within the project.
    pub role: Option<String>,
    /// May edit project content.
    #[serde(default)]
    pub can_edit: bool,
    /// May delete project content.
    #[serde(default)]
    pub can_delete: bool,
    /// May manage other members.
    #[serde(default)]
    pub can_manage_members: bool,
    /// May view the project.
    #[serde(default = "default_true")]
    pub can_view: bool,
}

fn default_true() -> bool {
    true
}

/// Request payload for updating a membership.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRequest {
    /// Role label within the project.
    pub role: Option<String>,
    /// May edit project content.
    pub can_edit: Option<bool>,
    /// May delete project content.
    pub can_delete: Option<bool>,
    /// May manage other members.
    pub can_manage_members: Option<bool>,
    /// May view the project.
    pub can_view: Option<bool>,
}

/// Parses a status label through the domain vocabulary into the column enum.
fn parse_status(status: &str) -> Option<ProjectStatus> {
    sdx_core::project::ProjectStatus::parse(status).map(|s| match s {
        sdx_core::project::ProjectStatus::Planning => ProjectStatus::Planning,
        sdx_core::project::ProjectStatus::InProgress => ProjectStatus::InProgress,
        sdx_core::project::ProjectStatus::Completed => ProjectStatus::Completed,
        sdx_core::project::ProjectStatus::OnHold => ProjectStatus::OnHold,
        sdx_core::project::ProjectStatus::Cancelled => ProjectStatus::Cancelled,
    })
}

/// Parses a priority label through the domain vocabulary into the column enum.
pub(crate) fn parse_priority(priority: &str) -> Option<Priority> {
    sdx_core::project::Priority::parse(priority).map(|p| match p {
        sdx_core::project::Priority::Low => Priority::Low,
        sdx_core::project::Priority::Medium => Priority::Medium,
        sdx_core::project::Priority::High => Priority::High,
        sdx_core::project::Priority::Critical => Priority::Critical,
    })
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

fn forbidden(message: &str) -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
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
            "message": "Project not found"
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

/// Checks whether the user may modify the project: managers and admins
/// always can, members need the `can_edit` flag.
async fn can_edit_project(
    state: &AppState,
    auth: &AuthUser,
    project_id: uuid::Uuid,
) -> Result<bool, sea_orm::DbErr> {
    if auth.has_role("manager") {
        return Ok(true);
    }

    let membership = MemberRepository::new((*state.db).clone())
        .get_membership(project_id, auth.user_id())
        .await?;

    Ok(membership.is_some_and(|m| m.can_edit))
}

/// GET /projects - List projects with filters.
async fn list_projects(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListProjectsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref().map(parse_status) {
        Some(None) => return validation_error("Unknown project status"),
        other => other.flatten(),
    };
    let priority = match query.priority.as_deref().map(parse_priority) {
        Some(None) => return validation_error("Unknown priority"),
        other => other.flatten(),
    };

    let page = page.clamped();
    let repo = ProjectRepository::new((*state.db).clone());

    match repo
        .list(
            ProjectFilter {
                status,
                priority,
                manager_id: query.manager_id,
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
            error!(error = %e, "Database error listing projects");
            internal_error()
        }
    }
}

/// POST /projects - Create a project (manager or admin).
async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    if !auth.has_role("manager") {
        return forbidden("Manager role required to create projects");
    }

    if sdx_core::project::validate_name(&payload.name).is_err() {
        return validation_error("Project name must be 2-100 characters");
    }
    if sdx_core::project::validate_dates(payload.start_date, payload.end_date).is_err() {
        return validation_error("End date must not be before start date");
    }

    let status = match payload.status.as_deref() {
        None => ProjectStatus::Planning,
        Some(s) => match parse_status(s) {
            Some(s) => s,
            None => return validation_error("Unknown project status"),
        },
    };
    let priority = match payload.priority.as_deref() {
        None => Priority::Medium,
        Some(p) => match parse_priority(p) {
            Some(p) => p,
            None => return validation_error("Unknown priority"),
        },
    };

    let repo = ProjectRepository::new((*state.db).clone());
    let project = match repo
        .create(CreateProjectInput {
            name: payload.name,
            description: payload.description,
            status,
            priority,
            budget: payload.budget,
            start_date: payload.start_date,
            end_date: payload.end_date,
            estimated_hours: payload.estimated_hours,
            client_name: payload.client_name,
            manager_id: payload.manager_id.or(Some(auth.user_id())),
            created_by: auth.user_id(),
        })
        .await
    {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "Failed to create project");
            return internal_error();
        }
    };

    let (ip_address, user_agent) = client_meta(&headers);
    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: auth.user_id(),
            project_id: Some(project.id),
            task_id: None,
            action: "project.created".to_string(),
            details: Some(project.name.clone()),
            ip_address,
            user_agent,
        })
        .await;

    info!(project_id = %project.id, "Project created");

    (StatusCode::CREATED, Json(project)).into_response()
}

/// GET `/projects/{project_id}` - Get project details.
async fn get_project(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());

    match repo.find_by_id(project_id).await {
        Ok(Some(project)) => (StatusCode::OK, Json(project)).into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching project");
            internal_error()
        }
    }
}

/// PATCH `/projects/{project_id}` - Update a project.
#[allow(clippy::too_many_lines)]
async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateProjectRequest>,
) -> impl IntoResponse {
    match can_edit_project(&state, &auth, project_id).await {
        Ok(true) => {}
        Ok(false) => return forbidden("You cannot edit this project"),
        Err(e) => {
            error!(error = %e, "Database error checking permissions");
            return internal_error();
        }
    }

    if let Some(name) = payload.name.as_deref()
        && sdx_core::project::validate_name(name).is_err()
    {
        return validation_error("Project name must be 2-100 characters");
    }

    let status = match payload.status.as_deref().map(parse_status) {
        Some(None) => return validation_error("Unknown project status"),
        other => other.flatten(),
    };
    let priority = match payload.priority.as_deref().map(parse_priority) {
        Some(None) => return validation_error("Unknown priority"),
        other => other.flatten(),
    };

    let repo = ProjectRepository::new((*state.db).clone());

    // Date-range validation needs the stored values for one-sided updates
    if payload.start_date.is_some() || payload.end_date.is_some() {
        let existing = match repo.find_by_id(project_id).await {
            Ok(Some(p)) => p,
            Ok(None) => return not_found(),
            Err(e) => {
                error!(error = %e, "Database error fetching project");
                return internal_error();
            }
        };

        let start = payload.start_date.or(existing.start_date);
        let end = payload.end_date.or(existing.end_date);
        if sdx_core::project::validate_dates(start, end).is_err() {
            return validation_error("End date must not be before start date");
        }
    }

    let input = UpdateProjectInput {
        name: payload.name,
        description: payload.description.map(Some),
        status,
        priority,
        budget: payload.budget.map(Some),
        actual_cost: payload.actual_cost,
        start_date: payload.start_date.map(Some),
        end_date: payload.end_date.map(Some),
        estimated_hours: payload.estimated_hours.map(Some),
        client_name: payload.client_name.map(Some),
        manager_id: payload.manager_id.map(Some),
        updated_by: Some(auth.user_id()),
    };

    match repo.update(project_id, input).await {
        Ok(project) => {
            let _ = AuditRepository::new((*state.db).clone())
                .record(RecordAuditInput {
                    user_id: auth.user_id(),
                    project_id: Some(project.id),
                    task_id: None,
                    action: "project.updated".to_string(),
                    details: None,
                    ip_address: None,
                    user_agent: None,
                })
                .await;

            info!(project_id = %project.id, "Project updated");
            (StatusCode::OK, Json(project)).into_response()
        }
        Err(sea_orm::DbErr::RecordNotFound(_)) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to update project");
            internal_error()
        }
    }
}

/// DELETE `/projects/{project_id}` - Delete a project (admin only).
///
/// Tasks are removed by the FK cascade.
async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden("Administrator role required to delete projects");
    }

    let repo = ProjectRepository::new((*state.db).clone());

    match repo.delete(project_id).await {
        Ok(true) => {
            let _ = AuditRepository::new((*state.db).clone())
                .record(RecordAuditInput {
                    user_id: auth.user_id(),
                    project_id: Some(project_id),
                    task_id: None,
                    action: "project.deleted".to_string(),
                    details: None,
                    ip_address: None,
                    user_agent: None,
                })
                .await;

            info!(%project_id, "Project deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to delete project");
            internal_error()
        }
    }
}

/// GET `/projects/{project_id}/stats` - Task aggregates for a project.
async fn project_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = ProjectRepository::new((*state.db).clone());

    match repo.find_by_id(project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching project");
            return internal_error();
        }
    }

    match repo.stats(project_id).await {
        Ok(stats) => (
            StatusCode::OK,
            Json(json!({
                "total_tasks": stats.total_tasks,
                "done_tasks": stats.done_tasks,
                "in_progress_tasks": stats.in_progress_tasks,
                "blocked_tasks": stats.blocked_tasks,
                "logged_hours": stats.logged_hours,
                "completion_percent": stats.completion_percent
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error computing stats");
            internal_error()
        }
    }
}

/// POST `/projects/{project_id}/recompute` - Reconcile the stored
/// completion percentage with the task statuses (manager or admin).
async fn recompute_completion(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.has_role("manager") {
        return forbidden("Manager role required");
    }

    let repo = ProjectRepository::new((*state.db).clone());

    match repo.recompute_completion(project_id).await {
        Ok(progress) => (
            StatusCode::OK,
            Json(json!({ "project_id": project_id, "progress": progress })),
        )
            .into_response(),
        Err(sea_orm::DbErr::RecordNotFound(_)) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to recompute completion");
            internal_error()
        }
    }
}

/// Checks whether the user may manage members of the project.
async fn can_manage_members(
    state: &AppState,
    auth: &AuthUser,
    project_id: uuid::Uuid,
) -> Result<bool, sea_orm::DbErr> {
    if auth.has_role("manager") {
        return Ok(true);
    }

    let membership = MemberRepository::new((*state.db).clone())
        .get_membership(project_id, auth.user_id())
        .await?;

    Ok(membership.is_some_and(|m| m.can_manage_members))
}

/// GET `/projects/{project_id}/members` - List project members.
async fn list_members(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let repo = MemberRepository::new((*state.db).clone());

    match repo.list_for_project(project_id).await {
        Ok(members) => {
            let data: Vec<_> = members
                .iter()
                .map(|m| {
                    json!({
                        "user_id": m.user.id,
                        "username": m.user.username,
                        "first_name": m.user.first_name,
                        "last_name": m.user.last_name,
                        "role": m.membership.role,
                        "can_edit": m.membership.can_edit,
                        "can_delete": m.membership.can_delete,
                        "can_manage_members": m.membership.can_manage_members,
                        "can_view": m.membership.can_view,
                        "joined_at": m.membership.joined_at
                    })
                })
                .collect();

            (StatusCode::OK, Json(json!({ "members": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing members");
            internal_error()
        }
    }
}

/// POST `/projects/{project_id}/members` - Add a member.
async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<uuid::Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    match can_manage_members(&state, &auth, project_id).await {
        Ok(true) => {}
        Ok(false) => return forbidden("You cannot manage members of this project"),
        Err(e) => {
            error!(error = %e, "Database error checking permissions");
            return internal_error();
        }
    }

    let repo = MemberRepository::new((*state.db).clone());
    let member = match repo
        .add(AddMemberInput {
            project_id,
            user_id: payload.user_id,
            role: payload.role.unwrap_or_else(|| "Member".to_string()),
            can_edit: payload.can_edit,
            can_delete: payload.can_delete,
            can_manage_members: payload.can_manage_members,
            can_view: payload.can_view,
        })
        .await
    {
        Ok(m) => m,
        Err(MemberError::AlreadyMember) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "already_member",
                    "message": "User is already a member of this project"
                })),
            )
                .into_response();
        }
        Err(MemberError::ProjectNotFound(_)) => return not_found(),
        Err(MemberError::UserNotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": "User not found"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to add member");
            return internal_error();
        }
    };

    // Let the new member know
    if let Ok(Some(project)) = ProjectRepository::new((*state.db).clone())
        .find_by_id(project_id)
        .await
    {
        let _ = NotificationRepository::new((*state.db).clone())
            .create(CreateNotificationInput {
                user_id: member.user_id,
                kind: NotificationKind::Team,
                title: "Added to project".to_string(),
                body: format!("You were added to the project \"{}\"", project.name),
                priority: Priority::Medium,
            })
            .await;
    }

    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: auth.user_id(),
            project_id: Some(project_id),
            task_id: None,
            action: "project.member_added".to_string(),
            details: Some(format!("member {}", member.user_id)),
            ip_address: None,
            user_agent: None,
        })
        .await;

    info!(%project_id, member = %member.user_id, "Member added");

    (StatusCode::CREATED, Json(member)).into_response()
}

/// PATCH `/projects/{project_id}/members/{user_id}` - Update a membership.
async fn update_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, user_id)): Path<(uuid::Uuid, uuid::Uuid)>,
    Json(payload): Json<UpdateMemberRequest>,
) -> impl IntoResponse {
    match can_manage_members(&state, &auth, project_id).await {
        Ok(true) => {}
        Ok(false) => return forbidden("You cannot manage members of this project"),
        Err(e) => {
            error!(error = %e, "Database error checking permissions");
            return internal_error();
        }
    }

    let repo = MemberRepository::new((*state.db).clone());
    match repo
        .update(
            project_id,
            user_id,
            UpdateMemberInput {
                role: payload.role,
                can_edit: payload.can_edit,
                can_delete: payload.can_delete,
                can_manage_members: payload.can_manage_members,
                can_view: payload.can_view,
            },
        )
        .await
    {
        Ok(member) => (StatusCode::OK, Json(member)).into_response(),
        Err(MemberError::NotAMember) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_a_member",
                "message": "User is not a member of this project"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update member");
            internal_error()
        }
    }
}

/// DELETE `/projects/{project_id}/members/{user_id}` - Remove a member.
async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, user_id)): Path<(uuid::Uuid, uuid::Uuid)>,
) -> impl IntoResponse {
    match can_manage_members(&state, &auth, project_id).await {
        Ok(true) => {}
        Ok(false) => return forbidden("You cannot manage members of this project"),
        Err(e) => {
            error!(error = %e, "Database error checking permissions");
            return internal_error();
        }
    }

    let repo = MemberRepository::new((*state.db).clone());
    match repo.remove(project_id, user_id).await {
        Ok(()) => {
            let _ = AuditRepository::new((*state.db).clone())
                .record(RecordAuditInput {
                    user_id: auth.user_id(),
                    project_id: Some(project_id),
                    task_id: None,
                    action: "project.member_removed".to_string(),
                    details: Some(format!("member {user_id}")),
                    ip_address: None,
                    user_agent: None,
                })
                .await;

            StatusCode::NO_CONTENT.into_response()
        }
        Err(MemberError::NotAMember) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_a_member",
                "message": "User is not a member of this project"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to remove member");
            internal_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("planning"), Some(ProjectStatus::Planning));
        assert_eq!(parse_status("ON_HOLD"), Some(ProjectStatus::OnHold));
        assert_eq!(parse_status("archived"), None);
    }

    #[test]
    fn test_parse_priority() {
        assert_eq!(parse_priority("critical"), Some(Priority::Critical));
        assert_eq!(parse_priority("urgent"), None);
    }
}
