//! SQL DDL for the Flow Scheduler store.
//!
//! Every statement is idempotent so the schema can be applied on each startup.

pub const SCHEMA_VERSION: u32 = 1;

/// Deleting an employee unassigns its tasks (`ON DELETE SET NULL`).
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    title TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    access_level TEXT NOT NULL DEFAULT 'user' CHECK (access_level IN ('admin', 'user'))
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    deadline TEXT NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    assigned_employee_id INTEGER REFERENCES employees(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assigned_employee_id);
CREATE INDEX IF NOT EXISTS idx_tasks_pending_deadline ON tasks(completed, deadline, id);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);
"#;
