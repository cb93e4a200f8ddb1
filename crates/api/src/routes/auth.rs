//! Authentication routes for login, token refresh, and password changes.

use axum::http::HeaderMap;
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::routes::client_meta;
use crate::AppState;
use sdx_core::auth::{AccountState, LoginDecision, LoginGate, hash_password, verify_password};
use sdx_db::entities::{sea_orm_active_enums::UserRole, users};
use sdx_db::repositories::RecordAuditInput;
use sdx_db::{AuditRepository, UserRepository};
use sdx_shared::auth::{
    ChangePasswordRequest, LoginRequest, LoginResponse, RefreshRequest, UserInfo,
};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that require an authenticated user.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", axum::routing::get(me))
        .route("/auth/change-password", post(change_password))
}

/// Converts a `UserRole` enum to its string form for tokens.
fn role_to_string(role: UserRole) -> String {
    match role {
        UserRole::Admin => "admin".to_string(),
        UserRole::Manager => "manager".to_string(),
        UserRole::User => "user".to_string(),
        UserRole::Viewer => "viewer".to_string(),
    }
}

fn user_info(user: &users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: role_to_string(user.role),
        department: user.department.clone(),
        job_title: user.job_title.clone(),
    }
}

/// POST /auth/login - Authenticate and return tokens.
#[allow(clippy::too_many_lines)]
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    if payload.validate().is_err() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_credentials",
                "message": "Invalid username or password"
            })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());
    let audit_repo = AuditRepository::new((*state.db).clone());
    let (ip_address, user_agent) = client_meta(&headers);

    // Find the account
    let user = match user_repo.find_by_username(&payload.username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(username = %payload.username, "Login attempt for unknown username");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid username or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    // Admission: active flag and lockout window
    let gate = LoginGate::new(state.lockout);
    let account = AccountState {
        is_active: user.is_active,
        failed_attempts: u32::try_from(user.failed_login_attempts).unwrap_or(0),
        locked_until: user.locked_until.map(Into::into),
    };

    match gate.evaluate(account, Utc::now()) {
        LoginDecision::Admissible => {}
        LoginDecision::Inactive => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "account_disabled",
                    "message": "This account has been disabled"
                })),
            )
                .into_response();
        }
        LoginDecision::Locked(until) => {
            warn!(user_id = %user.id, locked_until = %until, "Login attempt on locked account");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "account_locked",
                    "message": "Account is temporarily locked after repeated failed logins"
                })),
            )
                .into_response();
        }
    }

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            let update = gate.register_failure(account, Utc::now());
            if let Err(e) = user_repo
                .record_failed_login(
                    user.id,
                    i32::try_from(update.failed_attempts).unwrap_or(i32::MAX),
                    update.locked_until,
                )
                .await
            {
                error!(error = %e, "Failed to persist failed-login counters");
            }

            let _ = audit_repo
                .record(RecordAuditInput {
                    user_id: user.id,
                    project_id: None,
                    task_id: None,
                    action: "auth.login_failed".to_string(),
                    details: Some(format!("attempt {}", update.failed_attempts)),
                    ip_address,
                    user_agent,
                })
                .await;

            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Invalid username or password"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    // Success: reset counters, stamp last login
    if let Err(e) = user_repo.record_successful_login(user.id).await {
        error!(error = %e, "Failed to record successful login");
        return internal_error("An error occurred during login");
    }

    let role = role_to_string(user.role);
    let access_token = match state.jwt_service.generate_access_token(user.id, &role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during login");
        }
    };

    let refresh_token = match state.jwt_service.generate_refresh_token(user.id, &role) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate refresh token");
            return internal_error("An error occurred during login");
        }
    };

    let _ = audit_repo
        .record(RecordAuditInput {
            user_id: user.id,
            project_id: None,
            task_id: None,
            action: "auth.login".to_string(),
            details: None,
            ip_address,
            user_agent,
        })
        .await;

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: user_info(&user),
        access_token,
        refresh_token,
        expires_in: state.jwt_service.access_token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Refresh access token using refresh token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state.jwt_service.validate_token(&payload.refresh_token) {
        Ok(c) => c,
        Err(e) => {
            let (error, message) = match e {
                sdx_shared::JwtError::Expired => ("token_expired", "Refresh token has expired"),
                _ => ("invalid_token", "Invalid refresh token"),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response();
        }
    };

    // A deactivated account must not refresh its way back in
    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(user)) if user.is_active => {}
        Ok(_) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "account_disabled",
                    "message": "This account has been disabled"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Database error during token refresh");
            return internal_error("An error occurred during token refresh");
        }
    }

    let access_token = match state
        .jwt_service
        .generate_access_token(claims.user_id(), &claims.role)
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during token refresh");
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "access_token": access_token,
            "expires_in": state.jwt_service.access_token_expires_in()
        })),
    )
        .into_response()
}

/// GET /auth/me - Return the authenticated user's profile.
async fn me(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user_info(&user))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "User not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error fetching profile");
            internal_error("An error occurred")
        }
    }
}

/// POST /auth/change-password - Change the authenticated user's password.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
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

    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
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
            error!(error = %e, "Database error during password change");
            return internal_error("An error occurred");
        }
    };

    match verify_password(&payload.current_password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_credentials",
                    "message": "Current password is incorrect"
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred");
        }
    }

    let new_hash = match hash_password(&payload.new_password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash new password");
            return internal_error("An error occurred");
        }
    };

    if let Err(e) = user_repo.update_password(user.id, &new_hash).await {
        error!(error = %e, "Failed to store new password");
        return internal_error("An error occurred");
    }

    let _ = AuditRepository::new((*state.db).clone())
        .record(RecordAuditInput {
            user_id: user.id,
            project_id: None,
            task_id: None,
            action: "auth.password_changed".to_string(),
            details: None,
            ip_address: None,
            user_agent: None,
        })
        .await;

    info!(user_id = %user.id, "Password changed");

    (
        StatusCode::OK,
        Json(json!({ "message": "Password changed successfully" })),
    )
        .into_response()
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": message
        })),
    )
        .into_response()
}
