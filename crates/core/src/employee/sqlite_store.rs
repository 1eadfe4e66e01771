//! SQLite-backed employee storage

use async_trait::async_trait;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, instrument};

use super::model::{
    normalize_email, AccessLevel, Employee, EmployeeCredentials, EmployeeUpdate, NewEmployee,
};
use super::repository::EmployeeRepository;
use crate::db::{constraint_violation, ConstraintViolation, Database};
use crate::{Error, Result};

const EMPLOYEE_COLUMNS: &str = "id, name, title, email, access_level";

impl FromSql for AccessLevel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err: Error| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for AccessLevel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

fn employee_from_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        email: row.get(3)?,
        access_level: row.get(4)?,
    })
}

fn load_employee(conn: &Connection, id: i64) -> Result<Option<Employee>> {
    let employee = conn
        .query_row(
            &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
            [id],
            employee_from_row,
        )
        .optional()?;
    Ok(employee)
}

/// Map a failed insert/update on `employees` to the domain error.
fn write_error(err: rusqlite::Error, email: &str) -> Error {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique) => Error::DuplicateEmail(email.to_string()),
        _ => err.into(),
    }
}

/// Employee store over the shared [`Database`]
#[derive(Clone)]
pub struct SqliteEmployeeStore {
    db: Database,
}

impl SqliteEmployeeStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for SqliteEmployeeStore {
    #[instrument(skip(self, employee), fields(email = %employee.email))]
    async fn create(&self, employee: NewEmployee) -> Result<Employee> {
        let email = normalize_email(&employee.email)?;
        self.db
            .transact(move |tx| {
                let access_level = match employee.access_level {
                    Some(level) => level,
                    None => {
                        let existing: i64 =
                            tx.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
                        if existing == 0 {
                            AccessLevel::Admin
                        } else {
                            AccessLevel::default()
                        }
                    }
                };

                tx.execute(
                    "INSERT INTO employees (name, title, email, password_hash, access_level)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        employee.name,
                        employee.title,
                        email,
                        employee.password_hash,
                        access_level
                    ],
                )
                .map_err(|err| write_error(err, &email))?;

                let created = Employee {
                    id: tx.last_insert_rowid(),
                    name: employee.name,
                    title: employee.title,
                    email,
                    access_level,
                };
                debug!(employee_id = created.id, access_level = %access_level, "employee created");
                Ok(created)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Employee>> {
        self.db
            .read(|tx| {
                let mut stmt =
                    tx.prepare(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id"))?;
                let employees = stmt
                    .query_map([], employee_from_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(employees)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> Result<Employee> {
        self.db
            .read(move |tx| load_employee(tx, id)?.ok_or(Error::EmployeeNotFound(id)))
            .await
    }

    #[instrument(skip(self))]
    async fn find_credentials(&self, email: &str) -> Result<Option<EmployeeCredentials>> {
        let email = normalize_email(email)?;
        self.db
            .read(move |tx| {
                let found = tx
                    .query_row(
                        &format!(
                            "SELECT {EMPLOYEE_COLUMNS}, password_hash FROM employees WHERE email = ?1"
                        ),
                        [&email],
                        |row| {
                            Ok(EmployeeCredentials {
                                employee: employee_from_row(row)?,
                                password_hash: row.get(5)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(found)
            })
            .await
    }

    #[instrument(skip(self, update))]
    async fn update(&self, id: i64, update: EmployeeUpdate) -> Result<Employee> {
        let email = update.email.as_deref().map(normalize_email).transpose()?;
        self.db
            .transact(move |tx| {
                let mut employee = load_employee(tx, id)?.ok_or(Error::EmployeeNotFound(id))?;
                if update.is_empty() {
                    return Ok(employee);
                }

                if let Some(name) = update.name {
                    employee.name = name;
                }
                if let Some(title) = update.title {
                    employee.title = title;
                }
                if let Some(email) = email {
                    employee.email = email;
                }
                if let Some(access_level) = update.access_level {
                    employee.access_level = access_level;
                }

                tx.execute(
                    "UPDATE employees
                     SET name = ?1, title = ?2, email = ?3, access_level = ?4,
                         password_hash = COALESCE(?5, password_hash)
                     WHERE id = ?6",
                    params![
                        employee.name,
                        employee.title,
                        employee.email,
                        employee.access_level,
                        update.password_hash,
                        id
                    ],
                )
                .map_err(|err| write_error(err, &employee.email))?;
                Ok(employee)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<()> {
        self.db
            .transact(move |tx| {
                let owned: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM tasks WHERE assigned_employee_id = ?1",
                    [id],
                    |row| row.get(0),
                )?;
                let removed = tx.execute("DELETE FROM employees WHERE id = ?1", [id])?;
                if removed == 0 {
                    return Err(Error::EmployeeNotFound(id));
                }
                debug!(employee_id = id, unassigned_tasks = owned, "employee deleted");
                Ok(())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<u64> {
        self.db
            .read(|tx| {
                let count: i64 =
                    tx.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
                Ok(u64::try_from(count).unwrap_or_default())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::DatabaseConfig;

    fn build_store() -> (SqliteEmployeeStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&DatabaseConfig::new(temp_dir.path().join("flow.db"))).unwrap();
        (SqliteEmployeeStore::new(db), temp_dir)
    }

    #[tokio::test]
    async fn first_employee_is_admin_then_users() {
        let (store, _tmp) = build_store();
        let first = store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com"))
            .await
            .unwrap();
        let second = store
            .create(NewEmployee::new("Bruno", "QA", "bruno@x.com"))
            .await
            .unwrap();

        assert_eq!(first.access_level, AccessLevel::Admin);
        assert_eq!(second.access_level, AccessLevel::User);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn duplicate_email_rejected_and_store_unchanged() {
        let (store, _tmp) = build_store();
        store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com"))
            .await
            .unwrap();

        let err = store
            .create(NewEmployee::new("Other", "Ops", " ANA@x.com "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(email) if email == "ana@x.com"));

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ana");
    }

    #[tokio::test]
    async fn get_missing_employee_is_not_found() {
        let (store, _tmp) = build_store();
        let err = store.get(42).await.unwrap_err();
        assert!(matches!(err, Error::EmployeeNotFound(42)));
    }

    #[tokio::test]
    async fn partial_update_keeps_absent_fields() {
        let (store, _tmp) = build_store();
        let ana = store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com"))
            .await
            .unwrap();

        let updated = store
            .update(
                ana.id,
                EmployeeUpdate {
                    title: Some("Lead".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Lead");
        assert_eq!(updated.name, "Ana");
        assert_eq!(updated.email, "ana@x.com");
        assert_eq!(store.get(ana.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_to_taken_email_fails() {
        let (store, _tmp) = build_store();
        store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com"))
            .await
            .unwrap();
        let bruno = store
            .create(NewEmployee::new("Bruno", "QA", "bruno@x.com"))
            .await
            .unwrap();

        let err = store
            .update(
                bruno.id,
                EmployeeUpdate {
                    email: Some("ana@x.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail(_)));
        assert_eq!(store.get(bruno.id).await.unwrap().email, "bruno@x.com");
    }

    #[tokio::test]
    async fn update_missing_employee_is_not_found() {
        let (store, _tmp) = build_store();
        let err = store
            .update(
                9,
                EmployeeUpdate {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmployeeNotFound(9)));
    }

    #[tokio::test]
    async fn credentials_lookup_returns_hash() {
        let (store, _tmp) = build_store();
        store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com").with_password_hash("v1$salt$digest"))
            .await
            .unwrap();

        let found = store.find_credentials("Ana@X.com").await.unwrap().unwrap();
        assert_eq!(found.employee.name, "Ana");
        assert_eq!(found.password_hash.as_deref(), Some("v1$salt$digest"));
        assert!(store.find_credentials("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn password_hash_update_is_optional() {
        let (store, _tmp) = build_store();
        let ana = store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com").with_password_hash("old"))
            .await
            .unwrap();

        store
            .update(
                ana.id,
                EmployeeUpdate {
                    name: Some("Ana Maria".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let creds = store.find_credentials("ana@x.com").await.unwrap().unwrap();
        assert_eq!(creds.password_hash.as_deref(), Some("old"));

        store
            .update(
                ana.id,
                EmployeeUpdate {
                    password_hash: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let creds = store.find_credentials("ana@x.com").await.unwrap().unwrap();
        assert_eq!(creds.password_hash.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn delete_removes_employee() {
        let (store, _tmp) = build_store();
        let ana = store
            .create(NewEmployee::new("Ana", "Dev", "ana@x.com"))
            .await
            .unwrap();

        store.delete(ana.id).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(matches!(
            store.delete(ana.id).await,
            Err(Error::EmployeeNotFound(_))
        ));
    }
}
