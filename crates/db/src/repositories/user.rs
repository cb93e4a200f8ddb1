//! User repository for database operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::UserRole, users};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Role.
    pub role: UserRole,
    /// Department.
    pub department: Option<String>,
    /// Job title.
    pub job_title: Option<String>,
}

/// Input for updating a user. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New email.
    pub email: Option<String>,
    /// First name (`Some(None)` clears).
    pub first_name: Option<Option<String>>,
    /// Last name.
    pub last_name: Option<Option<String>>,
    /// Role.
    pub role: Option<UserRole>,
    /// Phone number.
    pub phone: Option<Option<String>>,
    /// Department.
    pub department: Option<Option<String>>,
    /// Job title.
    pub job_title: Option<Option<String>>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
    }

    /// Checks if a username is already taken.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn username_exists(&self, username: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(input.role),
            is_active: Set(true),
            phone: Set(None),
            department: Set(input.department),
            job_title: Set(input.job_title),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await
    }

    /// Updates a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<users::Model, DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut active: users::ActiveModel = user.into();

        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(phone);
        }
        if let Some(department) = input.department {
            active.department = Set(department);
        }
        if let Some(job_title) = input.job_title {
            active.job_title = Set(job_title);
        }

        active.update(&self.db).await
    }

    /// Lists users ordered by username, optionally including deactivated
    /// accounts. Returns the page plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        include_inactive: bool,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<users::Model>, u64), DbErr> {
        let mut query = users::Entity::find().order_by_asc(users::Column::Username);

        if !include_inactive {
            query = query.filter(users::Column::IsActive.eq(true));
        }

        let paginator = query.paginate(&self.db, limit.max(1));
        let total = paginator.num_items().await?;
        let page = paginator.fetch_page(offset / limit.max(1)).await?;

        Ok((page, total))
    }

    /// Sets the soft-delete flag. Deactivation also clears any lockout so
    /// the account comes back clean if reactivated.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> Result<users::Model, DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.failed_login_attempts = Set(0);
        active.locked_until = Set(None);

        active.update(&self.db).await
    }

    /// Replaces the stored password hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(password_hash.to_string());
        active.update(&self.db).await?;

        Ok(())
    }

    /// Persists the failed-attempt counter and optional lockout expiry
    /// after a failed password check.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn record_failed_login(
        &self,
        id: Uuid,
        failed_attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut active: users::ActiveModel = user.into();
        active.failed_login_attempts = Set(failed_attempts);
        active.locked_until = Set(locked_until.map(Into::into));
        active.update(&self.db).await?;

        Ok(())
    }

    /// Resets lockout state and stamps the last login time after a
    /// successful authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn record_successful_login(&self, id: Uuid) -> Result<(), DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut active: users::ActiveModel = user.into();
        active.failed_login_attempts = Set(0);
        active.locked_until = Set(None);
        active.last_login_at = Set(Some(chrono::Utc::now().into()));
        active.update(&self.db).await?;

        Ok(())
    }

    /// Clears a lockout manually (admin unlock).
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn unlock(&self, id: Uuid) -> Result<(), DbErr> {
        let Some(user) = self.find_by_id(id).await? else {
            return Err(DbErr::RecordNotFound(format!("user {id}")));
        };

        let mut active: users::ActiveModel = user.into();
        active.failed_login_attempts = Set(0);
        active.locked_until = Set(None);
        active.update(&self.db).await?;

        Ok(())
    }
}
