//! Application settings routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::middleware::AuthUser;
use crate::AppState;
use sdx_core::settings::{SettingKind, SettingValue};
use sdx_db::entities::sea_orm_active_enums::SettingKind as DbSettingKind;
use sdx_db::entities::settings;
use sdx_db::SettingRepository;

/// Creates the settings router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(list_settings))
        .route("/settings/{key}", get(get_setting))
        .route("/settings/{key}", put(put_setting))
}

/// Query parameters for listing settings.
#[derive(Debug, Deserialize)]
struct ListSettingsQuery {
    category: Option<String>,
}

/// Request payload for upserting a setting.
#[derive(Debug, Deserialize)]
pub struct PutSettingRequest {
    /// Raw value text, validated against `kind`.
    pub value: String,
    /// Value kind label (string, integer, boolean, json).
    pub kind: String,
    /// Category for grouping (defaults to general).
    pub category: Option<String>,
}

const fn to_db_kind(kind: SettingKind) -> DbSettingKind {
    match kind {
        SettingKind::String => DbSettingKind::String,
        SettingKind::Integer => DbSettingKind::Integer,
        SettingKind::Boolean => DbSettingKind::Boolean,
        SettingKind::Json => DbSettingKind::Json,
    }
}

const fn from_db_kind(kind: DbSettingKind) -> SettingKind {
    match kind {
        DbSettingKind::String => SettingKind::String,
        DbSettingKind::Integer => SettingKind::Integer,
        DbSettingKind::Boolean => SettingKind::Boolean,
        DbSettingKind::Json => SettingKind::Json,
    }
}

/// Renders a setting with its value parsed into the declared kind.
fn setting_json(setting: &settings::Model) -> serde_json::Value {
    let value = SettingValue::parse(from_db_kind(setting.kind), &setting.value)
        .map_or_else(|_| json!(setting.value), |v| json!(v));

    json!({
        "key": setting.key,
        "value": value,
        "kind": setting.kind,
        "category": setting.category,
        "updated_by": setting.updated_by,
        "updated_at": setting.updated_at
    })
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

/// GET /settings - List settings, optionally by category.
async fn list_settings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListSettingsQuery>,
) -> impl IntoResponse {
    let repo = SettingRepository::new((*state.db).clone());

    match repo.list(query.category.as_deref()).await {
        Ok(rows) => {
            let data: Vec<_> = rows.iter().map(setting_json).collect();
            (StatusCode::OK, Json(json!({ "settings": data }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error listing settings");
            internal_error()
        }
    }
}

/// GET `/settings/{key}` - Get one setting.
async fn get_setting(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let repo = SettingRepository::new((*state.db).clone());

    match repo.get(&key).await {
        Ok(Some(setting)) => (StatusCode::OK, Json(setting_json(&setting))).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Setting not found"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Database error fetching setting");
            internal_error()
        }
    }
}

/// PUT `/settings/{key}` - Create or update a setting (admin only).
///
/// The value text must parse as the declared kind.
async fn put_setting(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
    Json(payload): Json<PutSettingRequest>,
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

    let Some(kind) = SettingKind::parse(&payload.kind) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": "Unknown setting kind"
            })),
        )
            .into_response();
    };

    if let Err(e) = SettingValue::parse(kind, &payload.value) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let repo = SettingRepository::new((*state.db).clone());
    match repo
        .upsert(
            &key,
            &payload.value,
            to_db_kind(kind),
            payload.category.as_deref().unwrap_or("general"),
            Some(auth.user_id()),
        )
        .await
    {
        Ok(setting) => {
            info!(%key, "Setting stored");
            (StatusCode::OK, Json(setting_json(&setting))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to store setting");
            internal_error()
        }
    }
}
