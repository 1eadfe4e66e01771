//! SQLite-backed task storage
//!
//! Listings LEFT JOIN `employees` so every row carries its assignee's name.

use async_trait::async_trait;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::model::{Deadline, NewTask, Task, TaskFilter, TaskUpdate, TaskWithAssignee};
use super::repository::TaskRepository;
use crate::db::{constraint_violation, ConstraintViolation, Database};
use crate::{Error, Result};

const TASK_COLUMNS: &str = "id, title, description, deadline, completed, assigned_employee_id";

const JOINED_SELECT: &str = "SELECT t.id, t.title, t.description, t.deadline, t.completed, \
     t.assigned_employee_id, e.name \
     FROM tasks t LEFT JOIN employees e ON e.id = t.assigned_employee_id";

impl FromSql for Deadline {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Deadline::parse(value.as_str()?).map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for Deadline {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        deadline: row.get(3)?,
        completed: row.get(4)?,
        assigned_employee_id: row.get(5)?,
    })
}

fn joined_from_row(row: &Row<'_>) -> rusqlite::Result<TaskWithAssignee> {
    Ok(TaskWithAssignee {
        task: task_from_row(row)?,
        assignee_name: row.get(6)?,
    })
}

fn load_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let task = conn
        .query_row(
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            [id],
            task_from_row,
        )
        .optional()?;
    Ok(task)
}

fn ensure_employee_exists(conn: &Connection, employee_id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?1)",
        [employee_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(Error::UnknownEmployee(employee_id))
    }
}

/// Map a failed insert/update on `tasks` to the domain error.
fn write_error(err: rusqlite::Error, assignee: Option<i64>) -> Error {
    match (constraint_violation(&err), assignee) {
        (Some(ConstraintViolation::ForeignKey), Some(employee_id)) => {
            Error::UnknownEmployee(employee_id)
        }
        _ => err.into(),
    }
}

/// Task store over the shared [`Database`]
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: Database,
}

impl SqliteTaskStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepository for SqliteTaskStore {
    #[instrument(skip(self, task), fields(assignee = ?task.assigned_employee_id))]
    async fn create(&self, task: NewTask) -> Result<Task> {
        self.db
            .transact(move |tx| {
                if let Some(employee_id) = task.assigned_employee_id {
                    ensure_employee_exists(tx, employee_id)?;
                }

                tx.execute(
                    "INSERT INTO tasks (title, description, deadline, completed, assigned_employee_id)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        task.title,
                        task.description,
                        task.deadline,
                        task.completed,
                        task.assigned_employee_id
                    ],
                )
                .map_err(|err| write_error(err, task.assigned_employee_id))?;

                let created = Task {
                    id: tx.last_insert_rowid(),
                    title: task.title,
                    description: task.description,
                    deadline: task.deadline,
                    completed: task.completed,
                    assigned_employee_id: task.assigned_employee_id,
                };
                debug!(task_id = created.id, "task created");
                Ok(created)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Task> {
        self.db
            .read(move |tx| load_task(tx, id)?.ok_or(Error::TaskNotFound(id)))
            .await
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: TaskFilter) -> Result<Vec<TaskWithAssignee>> {
        self.db
            .read(move |tx| {
                let mut stmt = tx.prepare(&format!(
                    "{JOINED_SELECT}
                     WHERE (?1 IS NULL OR t.assigned_employee_id = ?1)
                       AND (?2 IS NULL OR t.completed = ?2)
                     ORDER BY t.id
                     LIMIT ?3 OFFSET ?4"
                ))?;
                let limit = filter.limit.map(i64::from).unwrap_or(-1);
                let offset = i64::from(filter.offset.unwrap_or(0));
                let tasks = stmt
                    .query_map(
                        params![filter.assigned_employee_id, filter.completed, limit, offset],
                        joined_from_row,
                    )?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(tasks)
            })
            .await
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: i64, update: TaskUpdate) -> Result<Task> {
        self.db
            .transact(move |tx| {
                let mut task = load_task(tx, id)?.ok_or(Error::TaskNotFound(id))?;
                if update.is_empty() {
                    return Ok(task);
                }
                if let Some(employee_id) = update.new_assignee() {
                    ensure_employee_exists(tx, employee_id)?;
                }

                update.apply_to(&mut task);
                tx.execute(
                    "UPDATE tasks
                     SET title = ?1, description = ?2, deadline = ?3, completed = ?4,
                         assigned_employee_id = ?5
                     WHERE id = ?6",
                    params![
                        task.title,
                        task.description,
                        task.deadline,
                        task.completed,
                        task.assigned_employee_id,
                        id
                    ],
                )
                .map_err(|err| write_error(err, task.assigned_employee_id))?;
                Ok(task)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .transact(move |tx| {
                let removed = tx.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
                if removed == 0 {
                    return Err(Error::TaskNotFound(id));
                }
                Ok(())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn list_upcoming_pending(&self, limit: usize) -> Result<Vec<TaskWithAssignee>> {
        self.upcoming_pending(None, limit).await
    }

    #[instrument(skip(self))]
    async fn list_upcoming_pending_for(
        &self,
        employee_id: i64,
        limit: usize,
    ) -> Result<Vec<TaskWithAssignee>> {
        self.upcoming_pending(Some(employee_id), limit).await
    }
}

impl SqliteTaskStore {
    async fn upcoming_pending(
        &self,
        employee_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<TaskWithAssignee>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.db
            .read(move |tx| {
                let mut stmt = tx.prepare(&format!(
                    "{JOINED_SELECT}
                     WHERE t.completed = 0
                       AND (?1 IS NULL OR t.assigned_employee_id = ?1)
                     ORDER BY t.deadline ASC, t.id ASC
                     LIMIT ?2"
                ))?;
                let tasks = stmt
                    .query_map(params![employee_id, limit], joined_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(tasks)
            })
            .await
    }
}
