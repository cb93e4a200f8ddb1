//! Notification repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{
    notifications,
    sea_orm_active_enums::{NotificationKind, Priority},
};

/// Input for creating a notification.
#[derive(Debug, Clone)]
pub struct CreateNotificationInput {
    /// Recipient.
    pub user_id: Uuid,
    /// Kind of event.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Display priority.
    pub priority: Priority,
}

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: CreateNotificationInput,
    ) -> Result<notifications::Model, DbErr> {
        let notification = notifications::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            kind: Set(input.kind),
            title: Set(input.title),
            body: Set(input.body),
            priority: Set(input.priority),
            is_read: Set(false),
            read_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        notification.insert(&self.db).await
    }

    /// Lists a user's notifications, newest first.
    /// Returns the page plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        unread_only: bool,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<notifications::Model>, u64), DbErr> {
        let mut query = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt);

        if unread_only {
            query = query.filter(notifications::Column::IsRead.eq(false));
        }

        let per_page = limit.max(1);
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let page = paginator.fetch_page(offset / per_page).await?;

        Ok((page, total))
    }

    /// Counts a user's unread notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, DbErr> {
        notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .count(&self.db)
            .await
    }

    /// Marks one notification as read. The recipient check keeps one user
    /// from acknowledging another user's notifications.
    ///
    /// Returns `true` when the notification existed, belonged to the user,
    /// and was updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let Some(notification) = notifications::Entity::find_by_id(id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(false);
        };

        if notification.is_read {
            return Ok(true);
        }

        let mut active: notifications::ActiveModel = notification.into();
        active.is_read = Set(true);
        active.read_at = Set(Some(chrono::Utc::now().into()));
        active.update(&self.db).await?;

        Ok(true)
    }

    /// Marks all of a user's notifications as read. Returns how many rows
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, DbErr> {
        let unread = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .all(&self.db)
            .await?;

        let count = unread.len() as u64;
        let now = chrono::Utc::now().into();

        for notification in unread {
            let mut active: notifications::ActiveModel = notification.into();
            active.is_read = Set(true);
            active.read_at = Set(Some(now));
            active.update(&self.db).await?;
        }

        Ok(count)
    }
}
