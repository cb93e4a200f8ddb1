//! Time entry repository for database operations.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::time_entries;

/// Input for logging a time entry. The duration is computed by the caller
/// (from the start/end pair or supplied directly); the task's
/// `actual_hours` is maintained by trigger.
#[derive(Debug, Clone)]
pub struct CreateTimeEntryInput {
    /// Task the time was spent on.
    pub task_id: Uuid,
    /// User who did the work.
    pub user_id: Uuid,
    /// When the work started.
    pub started_at: DateTime<Utc>,
    /// When the work ended, if tracked.
    pub ended_at: Option<DateTime<Utc>>,
    /// Duration in hours.
    pub duration: Decimal,
    /// What was done.
    pub description: Option<String>,
    /// Calendar day the work belongs to.
    pub entry_date: NaiveDate,
    /// Whether the time is billable.
    pub is_billable: bool,
}

/// Time entry repository.
#[derive(Debug, Clone)]
pub struct TimeEntryRepository {
    db: DatabaseConnection,
}

impl TimeEntryRepository {
    /// Creates a new time entry repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a time entry by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<time_entries::Model>, DbErr> {
        time_entries::Entity::find_by_id(id).one(&self.db).await
    }

    /// Logs a new time entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails (including an FK
    /// violation for an unknown task).
    pub async fn create(&self, input: CreateTimeEntryInput) -> Result<time_entries::Model, DbErr> {
        let entry = time_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_id: Set(input.task_id),
            user_id: Set(input.user_id),
            started_at: Set(input.started_at.into()),
            ended_at: Set(input.ended_at.map(Into::into)),
            duration: Set(input.duration),
            description: Set(input.description),
            entry_date: Set(input.entry_date),
            is_billable: Set(input.is_billable),
            created_at: Set(chrono::Utc::now().into()),
        };

        entry.insert(&self.db).await
    }

    /// Deletes a time entry. Returns `true` when a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool, DbErr> {
        let Some(entry) = self.find_by_id(id).await? else {
            return Ok(false);
        };

        entry.delete(&self.db).await?;
        Ok(true)
    }

    /// Lists time entries for a task, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_task(&self, task_id: Uuid) -> Result<Vec<time_entries::Model>, DbErr> {
        time_entries::Entity::find()
            .filter(time_entries::Column::TaskId.eq(task_id))
            .order_by_desc(time_entries::Column::StartedAt)
            .all(&self.db)
            .await
    }

    /// Lists a user's time entries within an optional date range,
    /// most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<time_entries::Model>, DbErr> {
        let mut query = time_entries::Entity::find()
            .filter(time_entries::Column::UserId.eq(user_id))
            .order_by_desc(time_entries::Column::EntryDate);

        if let Some(from) = from {
            query = query.filter(time_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(time_entries::Column::EntryDate.lte(to));
        }

        query.all(&self.db).await
    }

    /// Sums the billable hours a user logged within a date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn billable_hours(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Decimal, DbErr> {
        let entries = time_entries::Entity::find()
            .filter(time_entries::Column::UserId.eq(user_id))
            .filter(time_entries::Column::IsBillable.eq(true))
            .filter(time_entries::Column::EntryDate.gte(from))
            .filter(time_entries::Column::EntryDate.lte(to))
            .all(&self.db)
            .await?;

        Ok(entries.iter().map(|e| e.duration).sum())
    }
}
