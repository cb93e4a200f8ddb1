//! User management routes (admin surface plus self-profile updates).

use axum::http::HeaderMap;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::routes::client_meta;
use crate::AppState;
use sdx_core::auth::{generate_temporary_password, hash_password};
use sdx_db::entities::{sea_orm_active_enums::UserRole, users};
use sdx_db::repositories::{CreateUserInput, RecordAuditInput, UpdateUserInput};
use sdx_db::{AuditRepository, UserRepository};
use sdx_shared::auth::{CreateUserRequest, UpdateUserRequest};
use sdx_shared::types::{PageRequest, PageResponse};

/// Creates the users router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{user_id}", get(get_user))
        .route("/users/{user_id}", patch(update_user))
        .route("/users/{user_id}", axum::routing::delete(deactivate_user))
        .route("/users/{user_id}/activate", post(activate_user))
        .route("/users/{user_id}/unlock", post(unlock_user))
        .route("/users/{user_id}/reset-password", post(reset_password))
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
struct ListUsersQuery {
    #[serde(default)]
    include_inactive: bool,
}

fn parse_role(role: &str) -> Option<UserRole> {
    match role.to_lowercase().as_str() {
        "admin" => Some(UserRole::Admin),
        "manager" => Some(UserRole::Manager),
        "user" => Some(UserRole::User),
        "viewer" => Some(UserRole::Viewer),
        _ => None,
    }
}

fn user_json(user: &users::Model) -> serde_json::Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "role": user.role,
        "is_active": user.is_active,
        "phone": user.phone,
        "department": user.department,
        "job_title": user.job_title,
        "last_login_at": user.last_login_at,
        "created_at": user.created_at
    })
}

fn forbidden() -> axum::response::Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": "Administrator role required"
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

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "User not found"
        })),
    )
        .into_response()
}

/// GET /users - List users (admin only).
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<ListUsersQuery>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let page = page.clamped();
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo
        .list(query.include_inactive, page.offset(), page.limit())
        .await
    {
        Ok((rows, total)) => {
            let data: Vec<_> = rows.iter().map(user_json).collect();
            (
                StatusCode::OK,
                Json(PageResponse::new(data, page.page, page.per_page, total)),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing users");
            internal_error()
        }
    }
}

/// POST /users - Create a user (admin only).
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    if let Err(e) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let Some(role) = parse_role(payload.role.as_deref().unwrap_or("user")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Unknown role"
            })),
        )
            .into_response();
    };

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.username_exists(&payload.username).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "username_exists",
                    "message": "An account with this username already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking username");
            return internal_error();
        }
    }

    match user_repo.email_exists(&payload.email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error();
        }
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    let user = match user_repo
        .create(CreateUserInput {
            username: payload.username,
            email: payload.email,
            password_hash,
            first_name: payload.first_name,
            last_name: payload.last_name,
            role,
            department: payload.department,
            job_title: payload.job_title,
        })
        .await
    {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error();
        }
    };

    // Welcome mail is best-effort; user creation already succeeded
    let display_name = user.first_name.clone().unwrap_or_else(|| user.username.clone());
    if let Err(e) = state
        .email_service
        .send_welcome_email(&user.email, &display_name, &user.username)
        .await
    {
        error!(error = %e, "Failed to send welcome email");
    }

    let (ip_address, user_agent) = client_meta(&headers);
    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: auth.user_id(),
            project_id: None,
            task_id: None,
            action: "user.created".to_string(),
            details: Some(format!("created {}", user.username)),
            ip_address,
            user_agent,
        })
        .await;

    info!(user_id = %user.id, username = %user.username, "User created");

    (StatusCode::CREATED, Json(user_json(&user))).into_response()
}

/// GET `/users/{user_id}` - Get a user (admin, or self).
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() && auth.user_id() != user_id {
        return forbidden();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user_json(&user))).into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            error!(error = %e, "Database error fetching user");
            internal_error()
        }
    }
}

/// PATCH `/users/{user_id}` - Update a user (admin, or self for profile
/// fields; role changes are admin only).
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    if !auth.is_admin() && auth.user_id() != user_id {
        return forbidden();
    }

    if payload.role.is_some() && !auth.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Only administrators can change roles"
            })),
        )
            .into_response();
    }

    if let Err(e) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let role = match payload.role.as_deref().map(parse_role) {
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "validation_error",
                    "message": "Unknown role"
                })),
            )
                .into_response();
        }
        Some(Some(role)) => Some(role),
        None => None,
    };

    let user_repo = UserRepository::new((*state.db).clone());
    let input = UpdateUserInput {
        email: payload.email,
        first_name: payload.first_name.map(Some),
        last_name: payload.last_name.map(Some),
        role,
        phone: payload.phone.map(Some),
        department: payload.department.map(Some),
        job_title: payload.job_title.map(Some),
    };

    match user_repo.update(user_id, input).await {
        Ok(user) => {
            info!(user_id = %user.id, "User updated");
            (StatusCode::OK, Json(user_json(&user))).into_response()
        }
        Err(sea_orm::DbErr::RecordNotFound(_)) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to update user");
            internal_error()
        }
    }
}

/// DELETE `/users/{user_id}` - Deactivate a user (admin only).
///
/// Accounts are never hard-deleted.
async fn deactivate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    if auth.user_id() == user_id {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "business_rule_violation",
                "message": "You cannot deactivate your own account"
            })),
        )
            .into_response();
    }

    set_active(&state, auth, user_id, false, "user.deactivated").await
}

/// POST `/users/{user_id}/activate` - Reactivate a user (admin only).
async fn activate_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    set_active(&state, auth, user_id, true, "user.activated").await
}

async fn set_active(
    state: &AppState,
    auth: AuthUser,
    user_id: uuid::Uuid,
    is_active: bool,
    action: &str,
) -> axum::response::Response {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.set_active(user_id, is_active).await {
        Ok(user) => {
            let _ = AuditRepository::new((*state.db).clone())
                .record(RecordAuditInput {
                    user_id: auth.user_id(),
                    project_id: None,
                    task_id: None,
                    action: action.to_string(),
                    details: Some(format!("target {}", user.username)),
                    ip_address: None,
                    user_agent: None,
                })
                .await;

            info!(target = %user.id, action, "User active flag changed");
            (StatusCode::OK, Json(user_json(&user))).into_response()
        }
        Err(sea_orm::DbErr::RecordNotFound(_)) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to change active flag");
            internal_error()
        }
    }
}

/// POST `/users/{user_id}/unlock` - Clear a lockout (admin only).
async fn unlock_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.unlock(user_id).await {
        Ok(()) => {
            let _ = AuditRepository::new((*state.db).clone())
                .record(RecordAuditInput {
                    user_id: auth.user_id(),
                    project_id: None,
                    task_id: None,
                    action: "user.unlocked".to_string(),
                    details: Some(format!("target {user_id}")),
                    ip_address: None,
                    user_agent: None,
                })
                .await;

            (
                StatusCode::OK,
                Json(json!({ "message": "Account unlocked" })),
            )
                .into_response()
        }
        Err(sea_orm::DbErr::RecordNotFound(_)) => not_found(),
        Err(e) => {
            error!(error = %e, "Failed to unlock user");
            internal_error()
        }
    }
}

/// POST `/users/{user_id}/reset-password` - Issue a temporary password
/// (admin only). The new password is emailed, never returned.
async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<uuid::Uuid>,
) -> impl IntoResponse {
    if !auth.is_admin() {
        return forbidden();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_id(user_id).await {
        Ok(Some(u)) => u,
        Ok(None) => return not_found(),
        Err(e) => {
            error!(error = %e, "Database error during password reset");
            return internal_error();
        }
    };

    let temporary_password = generate_temporary_password(12);
    let password_hash = match hash_password(&temporary_password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash temporary password");
            return internal_error();
        }
    };

    if let Err(e) = user_repo.update_password(user.id, &password_hash).await {
        error!(error = %e, "Failed to store temporary password");
        return internal_error();
    }

    let display_name = user.first_name.clone().unwrap_or_else(|| user.username.clone());
    if let Err(e) = state
        .email_service
        .send_password_reset_email(&user.email, &display_name, &temporary_password)
        .await
    {
        error!(error = %e, "Failed to send password reset email");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "email_failed",
                "message": "Password was reset but the email could not be sent"
            })),
        )
            .into_response();
    }

    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: auth.user_id(),
            project_id: None,
            task_id: None,
            action: "user.password_reset".to_string(),
            details: Some(format!("target {}", user.username)),
            ip_address: None,
            user_agent: None,
        })
        .await;

    info!(target = %user.id, "Password reset issued");

    (
        StatusCode::OK,
        Json(json!({ "message": "A temporary password has been emailed" })),
    )
        .into_response()
}
