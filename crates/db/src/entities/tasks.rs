//! `SeaORM` entity for the tasks table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{Priority, TaskStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning project; deleting the project deletes its tasks.
    pub project_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// 0-100, kept in step with status.
    pub progress: i32,
    pub assignee_id: Option<Uuid>,
    /// Who filed the task.
    pub reporter_id: Uuid,
    /// Parent for subtasks; must belong to the same project.
    pub parent_task_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((5, 1)))", nullable)]
    pub estimated_hours: Option<Decimal>,
    /// Sum of logged time entries, maintained by trigger.
    #[sea_orm(column_type = "Decimal(Some((5, 1)))")]
    pub actual_hours: Decimal,
    pub start_date: Option<Date>,
    pub due_date: Option<Date>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    /// Comma-separated labels.
    pub labels: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Projects,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AssigneeId",
        to = "super::users::Column::Id"
    )]
    Assignee,
    #[sea_orm(has_many = "super::time_entries::Entity")]
    TimeEntries,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignee.def()
    }
}

impl Related<super::time_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimeEntries.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
