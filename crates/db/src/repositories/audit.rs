//! Audit log repository for database operations.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::audit_logs;

/// Input for recording an audit entry.
#[derive(Debug, Clone)]
pub struct RecordAuditInput {
    /// Acting user.
    pub user_id: Uuid,
    /// Related project, if any.
    pub project_id: Option<Uuid>,
    /// Related task, if any.
    pub task_id: Option<Uuid>,
    /// Action label, e.g. "project.created".
    pub action: String,
    /// Free-form details.
    pub details: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client user agent.
    pub user_agent: Option<String>,
}

/// Filter options for querying the audit log.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Restrict to one user.
    pub user_id: Option<Uuid>,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Exact action label.
    pub action: Option<String>,
    /// Entries at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Entries at or before this time.
    pub to: Option<DateTime<Utc>>,
}

/// Audit log repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records an audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn record(&self, input: RecordAuditInput) -> Result<audit_logs::Model, DbErr> {
        let entry = audit_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            project_id: Set(input.project_id),
            task_id: Set(input.task_id),
            action: Set(input.action),
            details: Set(input.details),
            ip_address: Set(input.ip_address),
            user_agent: Set(input.user_agent),
            created_at: Set(chrono::Utc::now().into()),
        };

        entry.insert(&self.db).await
    }

    /// Queries the audit log, newest first.
    /// Returns the page plus the total row count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: AuditFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<audit_logs::Model>, u64), DbErr> {
        let mut query = audit_logs::Entity::find().order_by_desc(audit_logs::Column::CreatedAt);

        if let Some(user_id) = filter.user_id {
            query = query.filter(audit_logs::Column::UserId.eq(user_id));
        }
        if let Some(project_id) = filter.project_id {
            query = query.filter(audit_logs::Column::ProjectId.eq(project_id));
        }
        if let Some(action) = filter.action {
            query = query.filter(audit_logs::Column::Action.eq(action));
        }
        if let Some(from) = filter.from {
            query = query.filter(audit_logs::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(audit_logs::Column::CreatedAt.lte(to));
        }

        let per_page = limit.max(1);
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await?;
        let page = paginator.fetch_page(offset / per_page).await?;

        Ok((page, total))
    }
}
