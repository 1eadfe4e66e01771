//! Employee model definitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Access level of an employee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Admin,
    #[default]
    User,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(Error::InvalidInput(format!(
                "Unsupported access level '{}'",
                value
            ))),
        }
    }
}

/// A persisted employee. Never carries the credential hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub email: String,
    pub access_level: AccessLevel,
}

/// An employee together with its stored credential hash
#[derive(Debug, Clone)]
pub struct EmployeeCredentials {
    pub employee: Employee,
    pub password_hash: Option<String>,
}

/// Data for inserting a new employee
///
/// When `access_level` is `None` the store picks it: admin for the first
/// employee ever inserted, user afterwards.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub name: String,
    pub title: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub access_level: Option<AccessLevel>,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            email: email.into(),
            password_hash: None,
            access_level: None,
        }
    }

    /// Set the stored credential hash
    pub fn with_password_hash(mut self, password_hash: impl Into<String>) -> Self {
        self.password_hash = Some(password_hash.into());
        self
    }

    /// Force a specific access level
    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = Some(access_level);
        self
    }
}

/// Partial update: only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub access_level: Option<AccessLevel>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.title.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.access_level.is_none()
    }
}

/// Trim and lowercase an email, rejecting obviously malformed values.
pub fn normalize_email(email: &str) -> crate::Result<String> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(Error::InvalidInput("Invalid email".to_string()));
    }
    Ok(normalized)
}
