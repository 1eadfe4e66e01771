//! Task repository trait
//!
//! Defines the interface for task storage operations.

use async_trait::async_trait;

use super::model::{NewTask, Task, TaskFilter, TaskUpdate, TaskWithAssignee};
use crate::Result;

/// Repository interface for task CRUD operations
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task; the assignee, if any, must exist
    async fn create(&self, task: NewTask) -> Result<Task>;

    /// Get a task by ID
    async fn get(&self, id: i64) -> Result<Task>;

    /// List tasks matching `filter`, joined with assignee names, in ID order
    async fn list(&self, filter: TaskFilter) -> Result<Vec<TaskWithAssignee>>;

    /// Apply a partial update
    async fn update(&self, id: i64, update: TaskUpdate) -> Result<Task>;

    /// Delete a task by ID
    async fn delete(&self, id: i64) -> Result<()>;

    /// Pending tasks with the nearest deadlines, ties broken by ID
    async fn list_upcoming_pending(&self, limit: usize) -> Result<Vec<TaskWithAssignee>>;

    /// Same as [`TaskRepository::list_upcoming_pending`], restricted to one assignee
    async fn list_upcoming_pending_for(
        &self,
        employee_id: i64,
        limit: usize,
    ) -> Result<Vec<TaskWithAssignee>>;
}
