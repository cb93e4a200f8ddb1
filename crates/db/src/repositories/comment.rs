//! Comment repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::comments;

/// Comment repository. Comments are soft-deleted: the row stays, flagged
/// `is_deleted`, and is excluded from listings.
#[derive(Debug, Clone)]
pub struct CommentRepository {
    db: DatabaseConnection,
}

impl CommentRepository {
    /// Creates a new comment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<comments::Model>, DbErr> {
        comments::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a comment on a task.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails (including an FK
    /// violation for an unknown task).
    pub async fn create(
        &self,
        task_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Result<comments::Model, DbErr> {
        let comment = comments::ActiveModel {
            id: Set(Uuid::new_v4()),
            task_id: Set(task_id),
            author_id: Set(author_id),
            body: Set(body.to_string()),
            is_deleted: Set(false),
            edited_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        comment.insert(&self.db).await
    }

    /// Replaces a comment's body and stamps `edited_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment does not exist or the update fails.
    pub async fn update_body(&self, id: Uuid, body: &str) -> Result<comments::Model, DbErr> {
        let Some(comment) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("comment {id}")));
        };

        let mut active: comments::ActiveModel = comment.into();
        active.body = Set(body.to_string());
        active.edited_at = Set(Some(chrono::Utc::now().into()));

        active.update(&self.db).await
    }

    /// Soft-deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the comment does not exist or the update fails.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), DbErr> {
        let Some(comment) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("comment {id}")));
        };

        let mut active: comments::ActiveModel = comment.into();
        active.is_deleted = Set(true);
        active.update(&self.db).await?;

        Ok(())
    }

    /// Lists the live comments on a task, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_task(&self, task_id: Uuid) -> Result<Vec<comments::Model>, DbErr> {
        comments::Entity::find()
            .filter(comments::Column::TaskId.eq(task_id))
            .filter(comments::Column::IsDeleted.eq(false))
            .order_by_asc(comments::Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
