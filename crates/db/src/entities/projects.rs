//! `SeaORM` entity for the projects table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{Priority, ProjectStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    /// Planned budget.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub budget: Option<Decimal>,
    /// Money spent so far.
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub actual_cost: Decimal,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    /// Completion percentage, derived from task statuses (0-100).
    pub progress: i32,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))", nullable)]
    pub estimated_hours: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub actual_hours: Decimal,
    pub client_name: Option<String>,
    /// Owning manager.
    pub manager_id: Option<Uuid>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::project_members::Entity")]
    ProjectMembers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ManagerId",
        to = "super::users::Column::Id"
    )]
    Manager,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::project_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProjectMembers.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Manager.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
