//! Settings repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums::SettingKind, settings};

/// Settings repository. Values are stored as text with a declared kind;
/// the caller validates the text against the kind before persisting.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    db: DatabaseConnection,
}

impl SettingRepository {
    /// Creates a new settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets a setting by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, key: &str) -> Result<Option<settings::Model>, DbErr> {
        settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .one(&self.db)
            .await
    }

    /// Lists settings, optionally restricted to one category, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<settings::Model>, DbErr> {
        let mut query = settings::Entity::find().order_by_asc(settings::Column::Key);

        if let Some(category) = category {
            query = query.filter(settings::Column::Category.eq(category));
        }

        query.all(&self.db).await
    }

    /// Creates or updates a setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        kind: SettingKind,
        category: &str,
        updated_by: Option<Uuid>,
    ) -> Result<settings::Model, DbErr> {
        let now = chrono::Utc::now().into();

        match self.get(key).await? {
            Some(existing) => {
                let mut active: settings::ActiveModel = existing.into();
                active.value = Set(value.to_string());
                active.kind = Set(kind);
                active.category = Set(category.to_string());
                active.updated_by = Set(updated_by);
                active.updated_at = Set(now);
                active.update(&self.db).await
            }
            None => {
                let setting = settings::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    key: Set(key.to_string()),
                    value: Set(value.to_string()),
                    kind: Set(kind),
                    category: Set(category.to_string()),
                    updated_by: Set(updated_by),
                    updated_at: Set(now),
                };
                setting.insert(&self.db).await
            }
        }
    }
}
