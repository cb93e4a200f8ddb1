//! Initial database migration.
//!
//! Creates all enums, tables, indexes, triggers, functions, and reporting
//! views for the project tracker.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CORE TABLES
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PROJECTS_SQL).await?;
        db.execute_unprepared(TASKS_SQL).await?;
        db.execute_unprepared(PROJECT_MEMBERS_SQL).await?;

        // ============================================================
        // PART 3: SUPPORTING TABLES
        // ============================================================
        db.execute_unprepared(TIME_ENTRIES_SQL).await?;
        db.execute_unprepared(COMMENTS_SQL).await?;
        db.execute_unprepared(NOTIFICATIONS_SQL).await?;
        db.execute_unprepared(SETTINGS_SQL).await?;
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 5: VIEWS
        // ============================================================
        db.execute_unprepared(VIEWS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- User roles
CREATE TYPE user_role AS ENUM (
    'admin',
    'manager',
    'user',
    'viewer'
);

-- Project status
CREATE TYPE project_status AS ENUM (
    'planning',
    'in_progress',
    'completed',
    'on_hold',
    'cancelled'
);

-- Task status
CREATE TYPE task_status AS ENUM (
    'todo',
    'in_progress',
    'testing',
    'done',
    'blocked'
);

-- Priority levels (shared by projects, tasks, notifications)
CREATE TYPE priority AS ENUM (
    'low',
    'medium',
    'high',
    'critical'
);

-- Notification kinds
CREATE TYPE notification_kind AS ENUM (
    'info',
    'success',
    'warning',
    'error',
    'task',
    'project',
    'team',
    'system'
);

-- Setting value kinds
CREATE TYPE setting_kind AS ENUM (
    'string',
    'integer',
    'boolean',
    'json'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(50) NOT NULL UNIQUE,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    first_name VARCHAR(50),
    last_name VARCHAR(50),
    role user_role NOT NULL DEFAULT 'user',
    is_active BOOLEAN NOT NULL DEFAULT true,
    phone VARCHAR(20),
    department VARCHAR(50),
    job_title VARCHAR(100),
    failed_login_attempts INTEGER NOT NULL DEFAULT 0,
    locked_until TIMESTAMPTZ,
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_username_length CHECK (char_length(username) BETWEEN 3 AND 50)
);

CREATE INDEX idx_users_username ON users(username) WHERE is_active = true;
CREATE INDEX idx_users_role ON users(role);
";

const PROJECTS_SQL: &str = r"
CREATE TABLE projects (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(100) NOT NULL,
    description TEXT,
    status project_status NOT NULL DEFAULT 'planning',
    priority priority NOT NULL DEFAULT 'medium',
    budget NUMERIC(15, 2),
    actual_cost NUMERIC(15, 2) NOT NULL DEFAULT 0,
    start_date DATE,
    end_date DATE,
    progress INTEGER NOT NULL DEFAULT 0,
    estimated_hours NUMERIC(8, 2),
    actual_hours NUMERIC(8, 2) NOT NULL DEFAULT 0,
    client_name VARCHAR(100),
    manager_id UUID REFERENCES users(id),
    completed_at TIMESTAMPTZ,
    created_by UUID NOT NULL REFERENCES users(id),
    updated_by UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_project_name_length CHECK (char_length(name) BETWEEN 2 AND 100),
    CONSTRAINT chk_project_progress CHECK (progress BETWEEN 0 AND 100),
    CONSTRAINT chk_project_dates CHECK (
        start_date IS NULL OR end_date IS NULL OR end_date >= start_date
    )
);

CREATE INDEX idx_projects_status ON projects(status);
CREATE INDEX idx_projects_manager ON projects(manager_id);
";

const TASKS_SQL: &str = r"
CREATE TABLE tasks (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    description TEXT,
    status task_status NOT NULL DEFAULT 'todo',
    priority priority NOT NULL DEFAULT 'medium',
    progress INTEGER NOT NULL DEFAULT 0,
    assignee_id UUID REFERENCES users(id),
    reporter_id UUID NOT NULL REFERENCES users(id),
    parent_task_id UUID REFERENCES tasks(id) ON DELETE SET NULL,
    estimated_hours NUMERIC(5, 1),
    actual_hours NUMERIC(5, 1) NOT NULL DEFAULT 0,
    start_date DATE,
    due_date DATE,
    completed_at TIMESTAMPTZ,
    labels VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_task_name_length CHECK (char_length(name) BETWEEN 2 AND 100),
    CONSTRAINT chk_task_progress CHECK (progress BETWEEN 0 AND 100),
    CONSTRAINT chk_task_not_own_parent CHECK (parent_task_id IS DISTINCT FROM id),
    CONSTRAINT chk_task_dates CHECK (
        start_date IS NULL OR due_date IS NULL OR due_date >= start_date
    )
);

CREATE INDEX idx_tasks_project ON tasks(project_id);
CREATE INDEX idx_tasks_status ON tasks(status);
CREATE INDEX idx_tasks_assignee ON tasks(assignee_id);
CREATE INDEX idx_tasks_due_date ON tasks(due_date);
CREATE INDEX idx_tasks_parent ON tasks(parent_task_id);
";

const PROJECT_MEMBERS_SQL: &str = r"
CREATE TABLE project_members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role VARCHAR(50) NOT NULL DEFAULT 'Member',
    can_edit BOOLEAN NOT NULL DEFAULT false,
    can_delete BOOLEAN NOT NULL DEFAULT false,
    can_manage_members BOOLEAN NOT NULL DEFAULT false,
    can_view BOOLEAN NOT NULL DEFAULT true,
    joined_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_project_member UNIQUE (project_id, user_id)
);

CREATE INDEX idx_project_members_user ON project_members(user_id);
";

const TIME_ENTRIES_SQL: &str = r"
CREATE TABLE time_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    started_at TIMESTAMPTZ NOT NULL,
    ended_at TIMESTAMPTZ,
    duration NUMERIC(5, 2) NOT NULL,
    description VARCHAR(500),
    entry_date DATE NOT NULL DEFAULT CURRENT_DATE,
    is_billable BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_time_entry_duration CHECK (duration >= 0),
    CONSTRAINT chk_time_entry_range CHECK (ended_at IS NULL OR ended_at >= started_at)
);

CREATE INDEX idx_time_entries_task ON time_entries(task_id);
CREATE INDEX idx_time_entries_user ON time_entries(user_id);
CREATE INDEX idx_time_entries_date ON time_entries(entry_date);
";

const COMMENTS_SQL: &str = r"
CREATE TABLE comments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    author_id UUID NOT NULL REFERENCES users(id),
    body TEXT NOT NULL,
    is_deleted BOOLEAN NOT NULL DEFAULT false,
    edited_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_comment_not_empty CHECK (char_length(body) > 0)
);

CREATE INDEX idx_comments_task ON comments(task_id) WHERE is_deleted = false;
";

const NOTIFICATIONS_SQL: &str = r"
CREATE TABLE notifications (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    kind notification_kind NOT NULL DEFAULT 'info',
    title VARCHAR(255) NOT NULL,
    body TEXT NOT NULL,
    priority priority NOT NULL DEFAULT 'medium',
    is_read BOOLEAN NOT NULL DEFAULT false,
    read_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_notifications_user ON notifications(user_id, is_read);
CREATE INDEX idx_notifications_created ON notifications(created_at);
";

const SETTINGS_SQL: &str = r"
CREATE TABLE settings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    key VARCHAR(100) NOT NULL UNIQUE,
    value TEXT NOT NULL,
    kind setting_kind NOT NULL DEFAULT 'string',
    category VARCHAR(50) NOT NULL DEFAULT 'general',
    updated_by UUID REFERENCES users(id),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_settings_category ON settings(category);
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    project_id UUID,
    task_id UUID,
    action VARCHAR(100) NOT NULL,
    details TEXT,
    ip_address VARCHAR(45),
    user_agent VARCHAR(500),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_audit_logs_user ON audit_logs(user_id);
CREATE INDEX idx_audit_logs_project ON audit_logs(project_id);
CREATE INDEX idx_audit_logs_created ON audit_logs(created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: set_updated_at
-- Touches updated_at on every row modification
-- ============================================================
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at := now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
BEFORE UPDATE ON users
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_projects_updated_at
BEFORE UPDATE ON projects
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_tasks_updated_at
BEFORE UPDATE ON tasks
FOR EACH ROW
EXECUTE FUNCTION set_updated_at();

-- ============================================================
-- FUNCTION: recompute_project_completion
-- Derives projects.progress from the share of done tasks.
-- A project with no tasks is 0% complete.
-- ============================================================
CREATE OR REPLACE FUNCTION recompute_project_completion(p_project_id UUID)
RETURNS INTEGER AS $$
DECLARE
    total_count BIGINT;
    done_count BIGINT;
    pct INTEGER;
BEGIN
    SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'done')
    INTO total_count, done_count
    FROM tasks
    WHERE project_id = p_project_id;

    IF total_count = 0 THEN
        pct := 0;
    ELSE
        pct := round(100.0 * done_count / total_count);
    END IF;

    UPDATE projects
    SET progress = pct
    WHERE id = p_project_id AND progress IS DISTINCT FROM pct;

    RETURN pct;
END;
$$ LANGUAGE plpgsql;

-- ============================================================
-- FUNCTION: on_task_change
-- Cascades task changes into the owning project's completion.
-- Handles tasks moving between projects on UPDATE.
-- ============================================================
CREATE OR REPLACE FUNCTION on_task_change()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        PERFORM recompute_project_completion(OLD.project_id);
        RETURN NULL;
    END IF;

    PERFORM recompute_project_completion(NEW.project_id);

    IF TG_OP = 'UPDATE' AND OLD.project_id IS DISTINCT FROM NEW.project_id THEN
        PERFORM recompute_project_completion(OLD.project_id);
    END IF;

    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_task_completion
AFTER INSERT OR UPDATE OR DELETE ON tasks
FOR EACH ROW
EXECUTE FUNCTION on_task_change();

-- ============================================================
-- FUNCTION: recompute_task_actual_hours
-- Keeps tasks.actual_hours equal to the sum of its time entries
-- ============================================================
CREATE OR REPLACE FUNCTION recompute_task_actual_hours()
RETURNS TRIGGER AS $$
DECLARE
    target_task UUID;
    total NUMERIC(5, 1);
BEGIN
    IF TG_OP = 'DELETE' THEN
        target_task := OLD.task_id;
    ELSE
        target_task := NEW.task_id;
    END IF;

    SELECT COALESCE(SUM(duration), 0)
    INTO total
    FROM time_entries
    WHERE task_id = target_task;

    UPDATE tasks
    SET actual_hours = total
    WHERE id = target_task AND actual_hours IS DISTINCT FROM total;

    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_time_entry_hours
AFTER INSERT OR UPDATE OR DELETE ON time_entries
FOR EACH ROW
EXECUTE FUNCTION recompute_task_actual_hours();
";

const VIEWS_SQL: &str = r"
-- ============================================================
-- VIEW: project_summary_view
-- One row per project with task and member aggregates
-- ============================================================
CREATE VIEW project_summary_view AS
SELECT
    p.id,
    p.name,
    p.status,
    p.priority,
    p.progress,
    p.budget,
    p.actual_cost,
    p.start_date,
    p.end_date,
    p.manager_id,
    COUNT(t.id) AS total_tasks,
    COUNT(t.id) FILTER (WHERE t.status = 'done') AS done_tasks,
    COUNT(t.id) FILTER (WHERE t.status = 'in_progress') AS in_progress_tasks,
    COUNT(t.id) FILTER (
        WHERE t.due_date < CURRENT_DATE AND t.status <> 'done'
    ) AS overdue_tasks,
    (SELECT COUNT(*) FROM project_members pm WHERE pm.project_id = p.id) AS member_count,
    COALESCE(SUM(t.actual_hours), 0) AS logged_hours
FROM projects p
LEFT JOIN tasks t ON t.project_id = p.id
GROUP BY p.id;

-- ============================================================
-- VIEW: task_summary_view
-- Tasks joined with project and people names for listings
-- ============================================================
CREATE VIEW task_summary_view AS
SELECT
    t.id,
    t.name,
    t.status,
    t.priority,
    t.progress,
    t.due_date,
    t.estimated_hours,
    t.actual_hours,
    t.project_id,
    p.name AS project_name,
    t.assignee_id,
    a.username AS assignee_username,
    t.reporter_id,
    r.username AS reporter_username,
    (t.due_date < CURRENT_DATE AND t.status <> 'done') AS is_overdue
FROM tasks t
JOIN projects p ON p.id = t.project_id
LEFT JOIN users a ON a.id = t.assignee_id
JOIN users r ON r.id = t.reporter_id;

-- ============================================================
-- VIEW: user_workload_view
-- Open work per active user for team reporting
-- ============================================================
CREATE VIEW user_workload_view AS
SELECT
    u.id,
    u.username,
    u.first_name,
    u.last_name,
    u.department,
    COUNT(t.id) FILTER (WHERE t.status <> 'done') AS open_tasks,
    COUNT(t.id) FILTER (
        WHERE t.due_date < CURRENT_DATE AND t.status <> 'done'
    ) AS overdue_tasks,
    COUNT(t.id) FILTER (WHERE t.status = 'done') AS done_tasks,
    COALESCE((
        SELECT SUM(te.duration)
        FROM time_entries te
        WHERE te.user_id = u.id
          AND te.entry_date >= date_trunc('month', CURRENT_DATE)::date
    ), 0) AS hours_this_month
FROM users u
LEFT JOIN tasks t ON t.assignee_id = u.id
WHERE u.is_active = true
GROUP BY u.id;
";

const DROP_ALL_SQL: &str = r"
DROP VIEW IF EXISTS user_workload_view;
DROP VIEW IF EXISTS task_summary_view;
DROP VIEW IF EXISTS project_summary_view;

DROP TABLE IF EXISTS audit_logs CASCADE;
DROP TABLE IF EXISTS settings CASCADE;
DROP TABLE IF EXISTS notifications CASCADE;
DROP TABLE IF EXISTS comments CASCADE;
DROP TABLE IF EXISTS time_entries CASCADE;
DROP TABLE IF EXISTS project_members CASCADE;
DROP TABLE IF EXISTS tasks CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP FUNCTION IF EXISTS recompute_task_actual_hours();
DROP FUNCTION IF EXISTS on_task_change();
DROP FUNCTION IF EXISTS recompute_project_completion(UUID);
DROP FUNCTION IF EXISTS set_updated_at();

DROP TYPE IF EXISTS setting_kind;
DROP TYPE IF EXISTS notification_kind;
DROP TYPE IF EXISTS priority;
DROP TYPE IF EXISTS task_status;
DROP TYPE IF EXISTS project_status;
DROP TYPE IF EXISTS user_role;
";
