//! Project member repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{project_members, projects, users};

/// Error types for membership operations.
#[derive(Debug, thiserror::Error)]
pub enum MemberError {
    /// Project does not exist.
    #[error("Project not found: {0}")]
    ProjectNotFound(Uuid),

    /// User does not exist.
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// The user is already a member of the project.
    #[error("User is already a member of this project")]
    AlreadyMember,

    /// The user is not a member of the project.
    #[error("User is not a member of this project")]
    NotAMember,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for adding a member to a project.
#[derive(Debug, Clone)]
pub struct AddMemberInput {
    /// Project to join.
    pub project_id: Uuid,
    /// User to add.
    pub user_id: Uuid,
    /// Role label within the project.
    pub role: String,
    /// May edit project content.
    pub can_edit: bool,
    /// May delete project content.
    pub can_delete: bool,
    /// May manage other members.
    pub can_manage_members: bool,
    /// May view the project.
    pub can_view: bool,
}

/// Input for updating a membership. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMemberInput {
    /// Role label within the project.
    pub role: Option<String>,
    /// May edit project content.
    pub can_edit: Option<bool>,
    /// May delete project content.
    pub can_delete: Option<bool>,
    /// May manage other members.
    pub can_manage_members: Option<bool>,
    /// May view the project.
    pub can_view: Option<bool>,
}

/// A membership together with its user record.
#[derive(Debug, Clone)]
pub struct MemberWithUser {
    /// The membership row.
    pub membership: project_members::Model,
    /// The member's user record.
    pub user: users::Model,
}

/// Project member repository.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    db: DatabaseConnection,
}

impl MemberRepository {
    /// Creates a new member repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Adds a user to a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the project or user does not exist, or the user
    /// is already a member.
    pub async fn add(&self, input: AddMemberInput) -> Result<project_members::Model, MemberError> {
        if projects::Entity::find_by_id(input.project_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(MemberError::ProjectNotFound(input.project_id));
        }

        if users::Entity::find_by_id(input.user_id)
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(MemberError::UserNotFound(input.user_id));
        }

        if self.is_member(input.project_id, input.user_id).await? {
            return Err(MemberError::AlreadyMember);
        }

        let member = project_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(input.project_id),
            user_id: Set(input.user_id),
            role: Set(input.role),
            can_edit: Set(input.can_edit),
            can_delete: Set(input.can_delete),
            can_manage_members: Set(input.can_manage_members),
            can_view: Set(input.can_view),
            joined_at: Set(chrono::Utc::now().into()),
        };

        Ok(member.insert(&self.db).await?)
    }

    /// Updates a membership's role or permission flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not a member or the update fails.
    pub async fn update(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        input: UpdateMemberInput,
    ) -> Result<project_members::Model, MemberError> {
        let Some(membership) = self.get_membership(project_id, user_id).await? else {
            return Err(MemberError::NotAMember);
        };

        let mut active: project_members::ActiveModel = membership.into();

        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(can_edit) = input.can_edit {
            active.can_edit = Set(can_edit);
        }
        if let Some(can_delete) = input.can_delete {
            active.can_delete = Set(can_delete);
        }
        if let Some(can_manage_members) = input.can_manage_members {
            active.can_manage_members = Set(can_manage_members);
        }
        if let Some(can_view) = input.can_view {
            active.can_view = Set(can_view);
        }

        Ok(active.update(&self.db).await?)
    }

    /// Removes a user from a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is not a member or the delete fails.
    pub async fn remove(&self, project_id: Uuid, user_id: Uuid) -> Result<(), MemberError> {
        let Some(membership) = self.get_membership(project_id, user_id).await? else {
            return Err(MemberError::NotAMember);
        };

        membership.delete(&self.db).await?;
        Ok(())
    }

    /// Lists all members of a project with their user records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<MemberWithUser>, DbErr> {
        let rows = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project_id))
            .order_by_asc(project_members::Column::JoinedAt)
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(membership, user)| user.map(|u| MemberWithUser { membership, user: u }))
            .collect())
    }

    /// Gets a user's membership in a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_membership(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<project_members::Model>, DbErr> {
        project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project_id))
            .filter(project_members::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
    }

    /// Checks if a user is a member of a project.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_member(&self, project_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let count = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(project_id))
            .filter(project_members::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
