//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod audit;
pub mod comment;
pub mod member;
pub mod notification;
pub mod project;
pub mod report;
pub mod setting;
pub mod task;
pub mod time_entry;
pub mod user;

pub use audit::{AuditFilter, AuditRepository, RecordAuditInput};
pub use comment::CommentRepository;
pub use member::{AddMemberInput, MemberError, MemberRepository, MemberWithUser, UpdateMemberInput};
pub use notification::{CreateNotificationInput, NotificationRepository};
pub use project::{
    CreateProjectInput, ProjectFilter, ProjectRepository, ProjectStats, UpdateProjectInput,
};
pub use report::{ProjectSummaryRow, ReportRepository, UserWorkloadRow};
pub use setting::SettingRepository;
pub use task::{CreateTaskInput, DueTask, TaskError, TaskFilter, TaskRepository, UpdateTaskInput};
pub use time_entry::{CreateTimeEntryInput, TimeEntryRepository};
pub use user::{CreateUserInput, UpdateUserInput, UserRepository};
