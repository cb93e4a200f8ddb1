//! Project repository for database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, Statement,
};
use uuid::Uuid;

use crate::entities::{
    projects,
    sea_orm_active_enums::{Priority, ProjectStatus, TaskStatus},
    tasks,
};

/// Input for creating a project.
#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    /// Project name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Initial status.
    pub status: ProjectStatus,
    /// Priority.
    pub priority: Priority,
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
    pub manager_id: Option<Uuid>,
    /// Creating user.
    pub created_by: Uuid,
}

/// Input for updating a project. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateProjectInput {
    /// Project name.
    pub name: Option<String>,
    /// Description (`Some(None)` clears).
    pub description: Option<Option<String>>,
    /// Status.
    pub status: Option<ProjectStatus>,
    /// Priority.
    pub priority: Option<Priority>,
    /// Planned budget.
    pub budget: Option<Option<Decimal>>,
    /// Money spent so far.
    pub actual_cost: Option<Decimal>,
    /// Start date.
    pub start_date: Option<Option<NaiveDate>>,
    /// End date.
    pub end_date: Option<Option<NaiveDate>>,
    /// Estimated total hours.
    pub estimated_hours: Option<Option<Decimal>>,
    /// Client name.
    pub client_name: Option<Option<String>>,
    /// Owning manager.
    pub manager_id: Option<Option<Uuid>>,
    /// Updating user.
    pub updated_by: Option<Uuid>,
}

/// Filter options for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    /// Filter by status.
    pub status: Option<ProjectStatus>,
    /// Filter by priority.
    pub priority: Option<Priority>,
    /// Filter by owning manager.
    pub manager_id: Option<Uuid>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
}

/// Aggregates for a single project.
#[derive(Debug, Clone)]
pub struct ProjectStats {
    /// Total number of tasks.
    pub total_tasks: u64,
    /// Tasks in the done status.
    pub done_tasks: u64,
    /// Tasks currently in progress.
    pub in_progress_tasks: u64,
    /// Tasks currently blocked.
    pub blocked_tasks: u64,
    /// Hours logged across all tasks.
    pub logged_hours: Decimal,
    /// Completion percentage derived from the counts above.
    pub completion_percent: u8,
}

/// Project repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    db: DatabaseConnection,
}

impl ProjectRepository {
    /// Creates a new project repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a project by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<projects::Model>, DbErr> {
        projects::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateProjectInput) -> Result<projects::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let project = projects::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            status: Set(input.status),
            priority: Set(input.priority),
            budget: Set(input.budget),
            actual_cost: Set(Decimal::ZERO),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            progress: Set(0),
            estimated_hours: Set(input.estimated_hours),
            actual_hours: Set(Decimal::ZERO),
            client_name: Set(input.client_name),
            manager_id: Set(input.manager_id),
            completed_at: Set(None),
            created_by: Set(input.created_by),
            updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        project.insert(&self.db).await
    }

    /// Updates a project. A status change to `completed` stamps
    /// `completed_at`; leaving `completed` clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if the project does not exist or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProjectInput,
    ) -> Result<projects::Model, DbErr> {
        let Some(project) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("project {id}")));
        };

        let was_completed = project.status == ProjectStatus::Completed;
        let mut active: projects::ActiveModel = project.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
            if status == ProjectStatus::Completed && !was_completed {
                active.completed_at = Set(Some(chrono::Utc::now().into()));
            } else if status != ProjectStatus::Completed {
                active.completed_at = Set(None);
            }
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(budget) = input.budget {
            active.budget = Set(budget);
        }
        if let Some(actual_cost) = input.actual_cost {
            active.actual_cost = Set(actual_cost);
        }
        if let Some(start_date) = input.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(estimated_hours) = input.estimated_hours {
            active.estimated_hours = Set(estimated_hours);
        }
        if let Some(client_name) = input.client_name {
            active.client_name = Set(client_name);
        }
        if let Some(manager_id) = input.manager_id {
            active.manager_id = Set(manager_id);
        }
        if let Some(updated_by) = input.updated_by {
            active.updated_by = Set(Some(updated_by));
        }

        active.update(&self.db).await
    }

    /// Deletes a project. Tasks are removed by the FK cascade.
    ///
    /// Returns `true` when a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let Some(project) = self.find_by_id(id).await? else {
            return Ok(false);
        };

        project.delete(&self.db).await?;
        Ok(true)
    }

    /// Lists projects with filters and pagination, newest first.
    /// Returns the page plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: ProjectFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<projects::Model>, u64), DbErr> {
        let mut query = projects::Entity::find().order_by_desc(projects::Column::CreatedAt);

        if let Some(status) = filter.status {
            query = query.filter(projects::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(projects::Column::Priority.eq(priority));
        }
        if let Some(manager_id) = filter.manager_id {
            query = query.filter(projects::Column::ManagerId.eq(manager_id));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(projects::Column::Name.contains(search.trim()))
                    .add(projects::Column::ClientName.contains(search.trim())),
            );
        }

        let per_page = limit.max(1);
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let page = paginator.fetch_page(offset / per_page).await?;

        Ok((page, total))
    }

    /// Recomputes the completion percentage from task statuses via the
    /// database function, returning the new value. This mirrors the
    /// trigger and exists for explicit reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the project does not exist or the query fails.
    pub async fn recompute_completion(&self, id: Uuid) -> Result<i32, DbErr> {
        if self.find_by_id(id).await?.is_none() {
            return Err(DbErr::RecordNotFound(format!("project {id}")));
        }

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT recompute_project_completion($1) AS progress",
            [id.into()],
        );

        let row = self
            .db
            .query_one(stmt)
            .await?
            .ok_or_else(|| DbErr::Custom("completion recompute returned no row".to_string()))?;

        row.try_get("", "progress")
    }

    /// Computes task aggregates for a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stats(&self, id: Uuid) -> Result<ProjectStats, DbErr> {
        let total_tasks = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(id))
            .count(&self.db)
            .await?;

        let done_tasks = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(id))
            .filter(tasks::Column::Status.eq(TaskStatus::Done))
            .count(&self.db)
            .await?;

        let in_progress_tasks = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(id))
            .filter(tasks::Column::Status.eq(TaskStatus::InProgress))
            .count(&self.db)
            .await?;

        let blocked_tasks = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(id))
            .filter(tasks::Column::Status.eq(TaskStatus::Blocked))
            .count(&self.db)
            .await?;

        let logged_hours = tasks::Entity::find()
            .filter(tasks::Column::ProjectId.eq(id))
            .all(&self.db)
            .await?
            .iter()
            .map(|t| t.actual_hours)
            .sum();

        Ok(ProjectStats {
            total_tasks,
            done_tasks,
            in_progress_tasks,
            blocked_tasks,
            logged_hours,
            completion_percent: sdx_core::project::completion_percent(done_tasks, total_tasks),
        })
    }
}
