//! Database seeder for SDX Project Manager development and demos.
//!
//! Seeds the default admin account, a handful of demo users, a demo
//! project with tasks and members, and the default settings. Inserts are
//! existence-checked so the seeder can be re-run safely.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::str::FromStr;
use uuid::Uuid;

use sdx_core::auth::hash_password;
use sdx_db::entities::{
    project_members, projects,
    sea_orm_active_enums::{Priority, ProjectStatus, SettingKind, TaskStatus, UserRole},
    settings, tasks, users,
};

/// Admin user ID (consistent for all seeds)
const ADMIN_USER_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo manager ID (consistent for all seeds)
const DEMO_MANAGER_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Demo developer ID (consistent for all seeds)
const DEMO_DEVELOPER_ID: &str = "00000000-0000-0000-0000-000000000003";
/// Demo project ID (consistent for all seeds)
const DEMO_PROJECT_ID: &str = "00000000-0000-0000-0000-000000000010";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = sdx_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding admin account...");
    seed_admin(&db).await;

    println!("Seeding demo users...");
    seed_demo_users(&db).await;

    println!("Seeding demo project...");
    seed_demo_project(&db).await;

    println!("Seeding demo tasks...");
    seed_demo_tasks(&db).await;

    println!("Seeding project members...");
    seed_project_members(&db).await;

    println!("Seeding default settings...");
    seed_default_settings(&db).await;

    println!("Seeding complete!");
}

fn admin_user_id() -> Uuid {
    Uuid::parse_str(ADMIN_USER_ID).unwrap()
}

fn demo_manager_id() -> Uuid {
    Uuid::parse_str(DEMO_MANAGER_ID).unwrap()
}

fn demo_developer_id() -> Uuid {
    Uuid::parse_str(DEMO_DEVELOPER_ID).unwrap()
}

fn demo_project_id() -> Uuid {
    Uuid::parse_str(DEMO_PROJECT_ID).unwrap()
}

async fn user_exists(db: &DatabaseConnection, id: Uuid) -> bool {
    users::Entity::find_by_id(id)
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
}

fn user_model(
    id: Uuid,
    username: &str,
    email: &str,
    password_hash: String,
    first_name: &str,
    last_name: &str,
    role: UserRole,
    department: &str,
) -> users::ActiveModel {
    let now = Utc::now().into();
    users::ActiveModel {
        id: Set(id),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        first_name: Set(Some(first_name.to_string())),
        last_name: Set(Some(last_name.to_string())),
        role: Set(role),
        is_active: Set(true),
        phone: Set(None),
        department: Set(Some(department.to_string())),
        job_title: Set(None),
        failed_login_attempts: Set(0),
        locked_until: Set(None),
        last_login_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

/// Seeds the default admin account (admin / admin123).
///
/// The default password is a bootstrap convenience; change it after the
/// first login.
async fn seed_admin(db: &DatabaseConnection) {
    if user_exists(db, admin_user_id()).await {
        println!("  Admin account already exists, skipping...");
        return;
    }

    let password_hash = hash_password("admin123").expect("Failed to hash admin password");
    let admin = user_model(
        admin_user_id(),
        "admin",
        "admin@sdx.local",
        password_hash,
        "System",
        "Administrator",
        UserRole::Admin,
        "IT",
    );

    if let Err(e) = admin.insert(db).await {
        eprintln!("Failed to insert admin account: {e}");
    } else {
        println!("  Created admin account: admin/admin123");
    }
}

/// Seeds a demo manager and developer.
async fn seed_demo_users(db: &DatabaseConnection) {
    let demo_users = [
        (
            demo_manager_id(),
            "somchai",
            "somchai@sdx.local",
            "Somchai",
            "W.",
            UserRole::Manager,
            "Engineering",
        ),
        (
            demo_developer_id(),
            "natcha",
            "natcha@sdx.local",
            "Natcha",
            "P.",
            UserRole::User,
            "Engineering",
        ),
    ];

    for (id, username, email, first, last, role, department) in demo_users {
        if user_exists(db, id).await {
            println!("  User {username} already exists, skipping...");
            continue;
        }

        let password_hash = hash_password("changeme1").expect("Failed to hash demo password");
        let user = user_model(id, username, email, password_hash, first, last, role, department);

        if let Err(e) = user.insert(db).await {
            eprintln!("Failed to insert user {username}: {e}");
        } else {
            println!("  Created user: {username}");
        }
    }
}

/// Seeds a demo project owned by the demo manager.
async fn seed_demo_project(db: &DatabaseConnection) {
    if projects::Entity::find_by_id(demo_project_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo project already exists, skipping...");
        return;
    }

    let now = Utc::now();
    let today = now.date_naive();
    let project = projects::ActiveModel {
        id: Set(demo_project_id()),
        name: Set("Line Monitoring Dashboard".to_string()),
        description: Set(Some(
            "Internal dashboard for production line monitoring".to_string(),
        )),
        status: Set(ProjectStatus::InProgress),
        priority: Set(Priority::High),
        budget: Set(Some(Decimal::from_str("250000.00").unwrap())),
        actual_cost: Set(Decimal::from_str("72500.00").unwrap()),
        start_date: Set(Some(today - Duration::days(30))),
        end_date: Set(Some(today + Duration::days(60))),
        progress: Set(0),
        estimated_hours: Set(Some(Decimal::from_str("640.00").unwrap())),
        actual_hours: Set(Decimal::ZERO),
        client_name: Set(Some("Manufacturing Ops".to_string())),
        manager_id: Set(Some(demo_manager_id())),
        completed_at: Set(None),
        created_by: Set(admin_user_id()),
        updated_by: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    if let Err(e) = project.insert(db).await {
        eprintln!("Failed to insert demo project: {e}");
    } else {
        println!("  Created demo project: Line Monitoring Dashboard");
    }
}

/// Seeds tasks for the demo project; the completion trigger recomputes
/// the project progress from the done/total ratio as rows land.
async fn seed_demo_tasks(db: &DatabaseConnection) {
    let existing = tasks::Entity::find()
        .filter(tasks::Column::ProjectId.eq(demo_project_id()))
        .one(db)
        .await
        .ok()
        .flatten();

    if existing.is_some() {
        println!("  Demo tasks already exist, skipping...");
        return;
    }

    let today = Utc::now().date_naive();
    let demo_tasks = [
        (
            "Define sensor data schema",
            TaskStatus::Done,
            100,
            Priority::High,
            -20i64,
        ),
        (
            "Build ingestion service",
            TaskStatus::InProgress,
            25,
            Priority::High,
            10,
        ),
        (
            "Dashboard wireframes",
            TaskStatus::Testing,
            90,
            Priority::Medium,
            5,
        ),
        (
            "Alert thresholds review",
            TaskStatus::Todo,
            0,
            Priority::Low,
            25,
        ),
    ];

    for (name, status, progress, priority, due_offset) in demo_tasks {
        let completed_at = (status == TaskStatus::Done).then(|| Utc::now().into());
        let now = Utc::now().into();
        let task = tasks::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(demo_project_id()),
            name: Set(name.to_string()),
            description: Set(None),
            status: Set(status),
            priority: Set(priority),
            progress: Set(progress),
            assignee_id: Set(Some(demo_developer_id())),
            reporter_id: Set(demo_manager_id()),
            parent_task_id: Set(None),
            estimated_hours: Set(Some(Decimal::from_str("40.0").unwrap())),
            actual_hours: Set(Decimal::ZERO),
            start_date: Set(None),
            due_date: Set(Some(today + Duration::days(due_offset))),
            completed_at: Set(completed_at),
            labels: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        if let Err(e) = task.insert(db).await {
            eprintln!("Failed to insert task {name}: {e}");
        } else {
            println!("  Created task: {name}");
        }
    }
}

/// Seeds the demo project memberships.
async fn seed_project_members(db: &DatabaseConnection) {
    let members = [
        (demo_manager_id(), "Lead", true, true, true),
        (demo_developer_id(), "Member", true, false, false),
    ];

    for (user_id, role, can_edit, can_delete, can_manage) in members {
        let existing = project_members::Entity::find()
            .filter(project_members::Column::ProjectId.eq(demo_project_id()))
            .filter(project_members::Column::UserId.eq(user_id))
            .one(db)
            .await
            .ok()
            .flatten();

        if existing.is_some() {
            println!("  Membership for {user_id} already exists, skipping...");
            continue;
        }

        let member = project_members::ActiveModel {
            id: Set(Uuid::new_v4()),
            project_id: Set(demo_project_id()),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            can_edit: Set(can_edit),
            can_delete: Set(can_delete),
            can_manage_members: Set(can_manage),
            can_view: Set(true),
            joined_at: Set(Utc::now().into()),
        };

        if let Err(e) = member.insert(db).await {
            eprintln!("Failed to insert membership: {e}");
        } else {
            println!("  Added member: {role}");
        }
    }
}

/// Seeds the default application settings.
async fn seed_default_settings(db: &DatabaseConnection) {
    let defaults = [
        ("app.name", "SDX Project Manager", SettingKind::String, "general"),
        ("app.page_size", "20", SettingKind::Integer, "general"),
        ("notifications.due_soon_days", "1", SettingKind::Integer, "notifications"),
        ("notifications.enabled", "true", SettingKind::Boolean, "notifications"),
        (
            "reports.defaults",
            r#"{"period":"month","include_inactive":false}"#,
            SettingKind::Json,
            "reports",
        ),
    ];

    for (key, value, kind, category) in defaults {
        let existing = settings::Entity::find()
            .filter(settings::Column::Key.eq(key))
            .one(db)
            .await
            .ok()
            .flatten();

        if existing.is_some() {
            println!("  Setting {key} already exists, skipping...");
            continue;
        }

        let setting = settings::ActiveModel {
            id: Set(Uuid::new_v4()),
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            kind: Set(kind),
            category: Set(category.to_string()),
            updated_by: Set(Some(admin_user_id())),
            updated_at: Set(Utc::now().into()),
        };

        if let Err(e) = setting.insert(db).await {
            eprintln!("Failed to insert setting {key}: {e}");
        } else {
            println!("  Created setting: {key}");
        }
    }
}
