//! Core library for Flow Scheduler
//!
//! This crate contains the data-access core, including:
//! - Employee and task models
//! - Repository traits
//! - The SQLite entity store and its repository implementations

pub mod db;
pub mod employee;
pub mod error;
pub mod task;

pub use db::{Database, DatabaseConfig};
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
