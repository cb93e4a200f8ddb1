//! Database enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User role (`user_role` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Can manage projects, tasks, and teams.
    #[sea_orm(string_value = "manager")]
    Manager,
    /// Regular contributor.
    #[sea_orm(string_value = "user")]
    User,
    /// Read-only access.
    #[sea_orm(string_value = "viewer")]
    Viewer,
}

/// Project status (`project_status` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "project_status")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being planned.
    #[sea_orm(string_value = "planning")]
    Planning,
    /// Underway.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Finished.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Paused.
    #[sea_orm(string_value = "on_hold")]
    OnHold,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Task status (`task_status` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    #[sea_orm(string_value = "todo")]
    Todo,
    /// Being worked on.
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Under verification.
    #[sea_orm(string_value = "testing")]
    Testing,
    /// Finished.
    #[sea_orm(string_value = "done")]
    Done,
    /// Waiting on something.
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

/// Priority (`priority` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "priority")]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority.
    #[sea_orm(string_value = "low")]
    Low,
    /// Default priority.
    #[sea_orm(string_value = "medium")]
    Medium,
    /// High priority.
    #[sea_orm(string_value = "high")]
    High,
    /// Drop-everything priority.
    #[sea_orm(string_value = "critical")]
    Critical,
}

/// Notification kind (`notification_kind` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Informational.
    #[sea_orm(string_value = "info")]
    Info,
    /// Positive outcome.
    #[sea_orm(string_value = "success")]
    Success,
    /// Something needs attention.
    #[sea_orm(string_value = "warning")]
    Warning,
    /// Something failed.
    #[sea_orm(string_value = "error")]
    Error,
    /// Task-related event (assignment, due soon, overdue).
    #[sea_orm(string_value = "task")]
    Task,
    /// Project-related event.
    #[sea_orm(string_value = "project")]
    Project,
    /// Team/membership event.
    #[sea_orm(string_value = "team")]
    Team,
    /// System announcement.
    #[sea_orm(string_value = "system")]
    System,
}

/// Setting value kind (`setting_kind` enum).
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "setting_kind")]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
    /// Free-form text.
    #[sea_orm(string_value = "string")]
    String,
    /// 64-bit signed integer.
    #[sea_orm(string_value = "integer")]
    Integer,
    /// true/false.
    #[sea_orm(string_value = "boolean")]
    Boolean,
    /// Arbitrary JSON document.
    #[sea_orm(string_value = "json")]
    Json,
}
