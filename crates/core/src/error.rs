//! Error types for the core library

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Employee not found: {0}")]
    EmployeeNotFound(i64),

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Unknown employee: {0}")]
    UnknownEmployee(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Error::Storage(format!("connection pool: {err}"))
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Storage(format!("blocking task failed: {err}"))
    }
}
