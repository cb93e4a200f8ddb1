//! Reporting repository over the SQL views.
//!
//! Reads `project_summary_view`, `task_summary_view`, and
//! `user_workload_view`; the aggregation lives in the database.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement};
use uuid::Uuid;

/// One row of `project_summary_view`.
#[derive(Debug, Clone, FromQueryResult, serde::Serialize)]
pub struct ProjectSummaryRow {
    /// Project ID.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Status label.
    pub status: String,
    /// Priority label.
    pub priority: String,
    /// Completion percentage.
    pub progress: i32,
    /// Planned budget.
    pub budget: Option<Decimal>,
    /// Money spent so far.
    pub actual_cost: Decimal,
    /// Owning manager.
    pub manager_id: Option<Uuid>,
    /// Total number of tasks.
    pub total_tasks: i64,
    /// Tasks in the done status.
    pub done_tasks: i64,
    /// Tasks currently in progress.
    pub in_progress_tasks: i64,
    /// Open tasks past their due date.
    pub overdue_tasks: i64,
    /// Number of project members.
    pub member_count: i64,
    /// Hours logged across all tasks.
    pub logged_hours: Decimal,
}

/// One row of `user_workload_view`.
#[derive(Debug, Clone, FromQueryResult, serde::Serialize)]
pub struct UserWorkloadRow {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub username: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Department.
    pub department: Option<String>,
    /// Tasks not yet done.
    pub open_tasks: i64,
    /// Open tasks past their due date.
    pub overdue_tasks: i64,
    /// Tasks finished.
    pub done_tasks: i64,
    /// Hours logged this month.
    pub hours_this_month: Decimal,
}

/// Reporting repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the project summary rows, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn project_summaries(&self) -> Result<Vec<ProjectSummaryRow>, DbErr> {
        ProjectSummaryRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT id, name, status::text AS status, priority::text AS priority, progress, \
             budget, actual_cost, manager_id, total_tasks, done_tasks, in_progress_tasks, \
             overdue_tasks, member_count, logged_hours \
             FROM project_summary_view ORDER BY name",
        ))
        .all(&self.db)
        .await
    }

    /// Lists the workload rows for all active users, by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn user_workloads(&self) -> Result<Vec<UserWorkloadRow>, DbErr> {
        UserWorkloadRow::find_by_statement(Statement::from_string(
            DbBackend::Postgres,
            "SELECT id, username, first_name, last_name, department, open_tasks, \
             overdue_tasks, done_tasks, hours_this_month \
             FROM user_workload_view ORDER BY username",
        ))
        .all(&self.db)
        .await
    }
}
