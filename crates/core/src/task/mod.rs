//! Task module
//!
//! This module contains task-related types and logic.

mod model;
mod repository;
mod sqlite_store;

pub use model::*;
pub use repository::TaskRepository;
pub use sqlite_store::SqliteTaskStore;
