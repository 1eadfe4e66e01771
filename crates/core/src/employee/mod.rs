//! Employee module
//!
//! Employee records, their repository interface and the SQLite store.

mod model;
mod repository;
mod sqlite_store;

pub use model::*;
pub use repository::EmployeeRepository;
pub use sqlite_store::SqliteEmployeeStore;
