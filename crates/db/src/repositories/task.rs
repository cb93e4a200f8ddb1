//! Task repository for database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    projects,
    sea_orm_active_enums::{Priority, TaskStatus},
    tasks,
};

/// Error types for task operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Owning project does not exist.
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// Task does not exist.
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    /// Parent task does not exist.
    #[error("Parent task not found: {0}")]
    ParentNotFound(Uuid),

    /// Parent task belongs to a different project.
    #[error("Parent task belongs to a different project")]
    ParentWrongProject,

    /// A task cannot be its own parent.
    #[error("A task cannot be its own parent")]
    ParentIsSelf,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a task.
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Owning project.
    pub project_id: Uuid,
    /// Task name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Initial status.
    pub status: TaskStatus,
    /// Priority.
    pub priority: Priority,
    /// Initial progress (0-100), already coupled to the status.
    pub progress: i32,
    /// Assigned user.
    pub assignee_id: Option<Uuid>,
    /// Filing user.
    pub reporter_id: Uuid,
    /// Parent task for subtasks.
    pub parent_task_id: Option<Uuid>,
    /// Estimated hours.
    pub estimated_hours: Option<Decimal>,
    /// Start date.
    pub start_date: Option<NaiveDate>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Comma-separated labels.
    pub labels: Option<String>,
}

/// Input for updating a task. `None` leaves the field untouched.
///
/// Status and progress arrive already coupled: the route layer applies
/// the status/progress mapping rules before calling the repository.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
    /// Task name.
    pub name: Option<String>,
    /// Description (`Some(None)` clears).
    pub description: Option<Option<String>>,
    /// Status.
    pub status: Option<TaskStatus>,
    /// Priority.
    pub priority: Option<Priority>,
    /// Progress (0-100).
    pub progress: Option<i32>,
    /// Assigned user.
    pub assignee_id: Option<Option<Uuid>>,
    /// Parent task.
    pub parent_task_id: Option<Option<Uuid>>,
    /// Estimated hours.
    pub estimated_hours: Option<Option<Decimal>>,
    /// Start date.
    pub start_date: Option<Option<NaiveDate>>,
    /// Due date.
    pub due_date: Option<Option<NaiveDate>>,
    /// Comma-separated labels.
    pub labels: Option<Option<String>>,
}

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Filter by status.
    pub status: Option<TaskStatus>,
    /// Filter by priority.
    pub priority: Option<Priority>,
    /// Filter by assignee.
    pub assignee_id: Option<Uuid>,
    /// Only tasks past their due date and not done.
    pub overdue_only: bool,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
}

/// A task due soon or overdue, with enough context to notify the assignee.
#[derive(Debug, Clone)]
pub struct DueTask {
    /// The task.
    pub task: tasks::Model,
    /// Owning project name.
    pub project_name: String,
}

/// Task repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    db: DatabaseConnection,
}

impl TaskRepository {
    /// Creates a new task repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a task by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<tasks::Model>, DbErr> {
        tasks::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new task after validating the project and parent.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The project does not exist
    /// - The parent task does not exist or belongs to a different project
    pub async fn create(&self, input: CreateTaskInput) -> Result<tasks::Model, TaskError> {
        let project = projects::Entity::find_by_id(input.project_id)
            .one(&self.db)
            .await?;

        if project.is_none() {
            return Err(TaskError::ProjectNotFound(input.project_id));
        }

        if let Some(parent_id) = input.parent_task_id {
            self.check_parent(parent_id, input.project_id, None).await?;
        }

        let completed_at = (input.status == TaskStatus::Done)
            .then(|| chrono::Utc::now().into());

        let now = chrono::Utc::now().into();
        let task = tasks::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(input.project_id),
            name: Set(input.name),
            description: Set(input.description),
            status: Set(input.status),
            priority: Set(input.priority),
            progress: Set(input.progress),
            assignee_id: Set(input.assignee_id),
            reporter_id: Set(input.reporter_id),
            parent_task_id: Set(input.parent_task_id),
            estimated_hours: Set(input.estimated_hours),
            actual_hours: Set(Decimal::ZERO),
            start_date: Set(input.start_date),
            due_date: Set(input.due_date),
            completed_at: Set(completed_at),
            labels: Set(input.labels),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(task.insert(&self.db).await?)
    }

    /// Updates a task. Moving into `done` stamps `completed_at`; moving
    /// out of it clears the stamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the task does not exist, the parent is invalid,
    /// or the update fails.
    pub async fn update(&self, id: Uuid, input: UpdateTaskInput) -> Result<tasks::Model, TaskError> {
        let Some(task) = self.find_by_id(id).await? else {
            return Err(TaskError::TaskNotFound(id));
        };

        if let Some(Some(parent_id)) = input.parent_task_id {
            self.check_parent(parent_id, task.project_id, Some(id))
                .await?;
        }

        let was_done = task.status == TaskStatus::Done;
        let mut active: tasks::ActiveModel = task.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
            if status == TaskStatus::Done && !was_done {
                active.completed_at = Set(Some(chrono::Utc::now().into()));
            } else if status != TaskStatus::Done {
                active.completed_at = Set(None);
            }
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }
        if let Some(progress) = input.progress {
            active.progress = Set(progress);
        }
        if let Some(assignee_id) = input.assignee_id {
            active.assignee_id = Set(assignee_id);
        }
        if let Some(parent_task_id) = input.parent_task_id {
            active.parent_task_id = Set(parent_task_id);
        }
        if let Some(estimated_hours) = input.estimated_hours {
            active.estimated_hours = Set(estimated_hours);
        }
        if let Some(start_date) = input.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(due_date) = input.due_date {
            active.due_date = Set(due_date);
        }
        if let Some(labels) = input.labels {
            active.labels = Set(labels);
        }

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a task. Returns `true` when a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let Some(task) = self.find_by_id(id).await? else {
            return Ok(false);
        };

        task.delete(&self.db).await?;
        Ok(true)
    }

    /// Lists tasks with filters and pagination, due-date first then newest.
    /// Returns the page plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: TaskFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<tasks::Model>, u64), DbErr> {
        let mut query = tasks::Entity::find()
            .order_by_asc(tasks::Column::DueDate)
            .order_by_desc(tasks::Column::CreatedAt);

        if let Some(project_id) = filter.project_id {
            query = query.filter(tasks::Column::ProjectId.eq(project_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(tasks::Column::Status.eq(status));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(tasks::Column::Priority.eq(priority));
        }
        if let Some(assignee_id) = filter.assignee_id {
            query = query.filter(tasks::Column::AssigneeId.eq(assignee_id));
        }
        if filter.overdue_only {
            let today = chrono::Utc::now().date_naive();
            query = query
                .filter(tasks::Column::DueDate.lt(today))
                .filter(tasks::Column::Status.ne(TaskStatus::Done));
        }
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            query = query.filter(tasks::Column::Name.contains(search.trim()));
        }

        let per_page = limit.max(1);
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let page = paginator.fetch_page(offset / per_page).await?;

        Ok((page, total))
    }

    /// Lists the direct subtasks of a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn subtasks(&self, parent_id: Uuid) -> Result<Vec<tasks::Model>, DbErr> {
        tasks::Entity::find()
            .filter(tasks::Column::ParentTaskId.eq(parent_id))
            .order_by_asc(tasks::Column::CreatedAt)
            .all(&self.db)
            .await
    }

    /// Finds open, assigned tasks due within `days_ahead` days (inclusive
    /// of today), with project names, for the due-soon notification sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn due_soon(&self, days_ahead: i64) -> Result<Vec<DueTask>, DbErr> {
        let today = chrono::Utc::now().date_naive();
        let horizon = today + chrono::Duration::days(days_ahead);

        let rows = tasks::Entity::find()
            .filter(tasks::Column::DueDate.gte(today))
            .filter(tasks::Column::DueDate.lte(horizon))
            .filter(tasks::Column::Status.ne(TaskStatus::Done))
            .filter(tasks::Column::AssigneeId.is_not_null())
            .find_also_related(projects::Entity)
            .all(&self.db)
            .await?;

        Ok(collect_due_tasks(rows))
    }

    /// Finds open, assigned tasks already past their due date, with
    /// project names, for the overdue notification sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn overdue(&self) -> Result<Vec<DueTask>, DbErr> {
        let today = chrono::Utc::now().date_naive();

        let rows = tasks::Entity::find()
            .filter(tasks::Column::DueDate.lt(today))
            .filter(tasks::Column::Status.ne(TaskStatus::Done))
            .filter(tasks::Column::AssigneeId.is_not_null())
            .find_also_related(projects::Entity)
            .all(&self.db)
            .await?;

        Ok(collect_due_tasks(rows))
    }

    /// Validates a parent reference: it must exist, belong to the same
    /// project, and not be the task itself.
    async fn check_parent(
        &self,
        parent_id: Uuid,
        project_id: Uuid,
        task_id: Option<Uuid>,
    ) -> Result<(), TaskError> {
        if task_id == Some(parent_id) {
            return Err(TaskError::ParentIsSelf);
        }

        let parent = tasks::Entity::find_by_id(parent_id).one(&self.db).await?;

        match parent {
            None => Err(TaskError::ParentNotFound(parent_id)),
            Some(p) if p.project_id != project_id => Err(TaskError::ParentWrongProject),
            _ => Ok(()),
        }
    }
}

fn collect_due_tasks(rows: Vec<(tasks::Model, Option<projects::Model>)>) -> Vec<DueTask> {
    rows.into_iter()
        .filter_map(|(task, project)| {
            project.map(|p| DueTask {
                task,
                project_name: p.name,
            })
        })
        .collect()
}
