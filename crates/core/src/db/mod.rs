//! SQLite entity store
//!
//! [`Database`] is the connection factory handed to every repository. Each
//! repository call borrows one pooled connection, runs inside a single
//! transaction and releases the connection when it returns.

mod connection;
pub mod schema;

pub use connection::{Database, DatabaseConfig};
pub(crate) use connection::{constraint_violation, ConstraintViolation};
