//! Task model definitions

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Display name used for tasks without an assignee
pub const UNASSIGNED_LABEL: &str = "N/A";

/// Number of tasks shown by the dashboard preview
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// A task deadline in fixed-width `YYYY-MM-DD` form
///
/// Kept as text so storage and wire format match; since the format is
/// fixed-width and zero-padded, string order equals date order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Deadline(String);

impl Deadline {
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let raw = raw.trim();
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| Error::InvalidInput(format!("Invalid deadline '{}'", raw)))?;
        let canonical = date.format("%Y-%m-%d").to_string();
        if canonical != raw {
            return Err(Error::InvalidInput(format!(
                "Deadline must be written as YYYY-MM-DD, got '{}'",
                raw
            )));
        }
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Deadline {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Deadline> for String {
    fn from(value: Deadline) -> Self {
        value.0
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Deadline,
    pub completed: bool,
    pub assigned_employee_id: Option<i64>,
}

/// A task joined with its assignee's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskWithAssignee {
    #[serde(flatten)]
    pub task: Task,
    pub assignee_name: Option<String>,
}

impl TaskWithAssignee {
    /// Assignee name, or [`UNASSIGNED_LABEL`] when nobody is assigned
    pub fn assignee_label(&self) -> &str {
        self.assignee_name.as_deref().unwrap_or(UNASSIGNED_LABEL)
    }
}

/// Data for inserting a new task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub deadline: Deadline,
    pub completed: bool,
    pub assigned_employee_id: Option<i64>,
}

impl NewTask {
    /// Create a pending, unassigned task
    pub fn new(title: impl Into<String>, deadline: Deadline) -> Self {
        Self {
            title: title.into(),
            description: None,
            deadline,
            completed: false,
            assigned_employee_id: None,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Assign to an employee
    pub fn with_assignee(mut self, employee_id: i64) -> Self {
        self.assigned_employee_id = Some(employee_id);
        self
    }

    /// Set the completion flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// Partial update
///
/// `None` keeps the stored value. For the clearable fields, `Some(None)`
/// clears the value and `Some(Some(_))` sets it.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub deadline: Option<Deadline>,
    pub completed: Option<bool>,
    pub assigned_employee_id: Option<Option<i64>>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.completed.is_none()
            && self.assigned_employee_id.is_none()
    }

    /// The assignee this update sets, if it sets one
    pub fn new_assignee(&self) -> Option<i64> {
        self.assigned_employee_id.flatten()
    }

    /// Write the supplied fields onto `task`
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(assignee) = self.assigned_employee_id {
            task.assigned_employee_id = assignee;
        }
    }
}

/// Listing filter with a simple offset/limit window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assigned_employee_id: Option<i64>,
    pub completed: Option<bool>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Only tasks assigned to `employee_id`
    pub fn assigned_to(employee_id: i64) -> Self {
        Self {
            assigned_employee_id: Some(employee_id),
            ..Self::default()
        }
    }

    /// Only tasks with the given completion state
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Restrict to a window of the ordered result
    pub fn with_window(mut self, offset: Option<u32>, limit: Option<u32>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}
