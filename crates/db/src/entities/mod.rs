//! `SeaORM` entity definitions.

pub mod audit_logs;
pub mod comments;
pub mod notifications;
pub mod project_members;
pub mod projects;
pub mod sea_orm_active_enums;
pub mod settings;
pub mod tasks;
pub mod time_entries;
pub mod users;
