//! Employee repository trait
//!
//! Defines the interface for employee storage operations.

use async_trait::async_trait;

use super::model::{Employee, EmployeeCredentials, EmployeeUpdate, NewEmployee};
use crate::Result;

/// Repository interface for employee CRUD operations
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Insert a new employee; fails with `DuplicateEmail` if the email is taken
    async fn create(&self, employee: NewEmployee) -> Result<Employee>;

    /// Get all employees in insertion order
    async fn list(&self) -> Result<Vec<Employee>>;

    /// Get an employee by ID
    async fn get(&self, id: i64) -> Result<Employee>;

    /// Look up an employee and its credential hash by (normalized) email
    async fn find_credentials(&self, email: &str) -> Result<Option<EmployeeCredentials>>;

    /// Apply a partial update
    async fn update(&self, id: i64, update: EmployeeUpdate) -> Result<Employee>;

    /// Delete an employee; its tasks become unassigned
    async fn delete(&self, id: i64) -> Result<()>;

    /// Number of stored employees
    async fn count(&self) -> Result<u64>;
}
