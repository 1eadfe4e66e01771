use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use flow_core::employee::{normalize_email, Employee, EmployeeRepository, NewEmployee};

use super::jwt::{IssuedToken, TokenIssuer};
use super::password::{hash_password, validate_password, verify_password};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    Expired,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<flow_core::Error> for AuthError {
    fn from(err: flow_core::Error) -> Self {
        match err {
            flow_core::Error::DuplicateEmail(email) => Self::DuplicateEmail(email),
            flow_core::Error::InvalidInput(message) => Self::InvalidInput(message),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Self-service registration data
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub title: String,
    pub email: String,
    pub password: String,
}

/// Registration, login and bearer-token resolution over the employee store
#[derive(Clone)]
pub struct AuthService {
    employees: Arc<dyn EmployeeRepository>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(employees: Arc<dyn EmployeeRepository>, tokens: TokenIssuer) -> Self {
        Self { employees, tokens }
    }

    /// Create an employee with a hashed password.
    ///
    /// The store makes the very first employee an admin.
    pub async fn register(&self, registration: Registration) -> Result<Employee, AuthError> {
        let name = required(&registration.name, "Name")?;
        let title = required(&registration.title, "Title")?;
        validate_password(&registration.password)?;

        let employee = self
            .employees
            .create(
                NewEmployee::new(name, title, registration.email)
                    .with_password_hash(hash_password(&registration.password)),
            )
            .await?;

        info!(
            employee_id = employee.id,
            access_level = %employee.access_level,
            "employee registered"
        );
        Ok(employee)
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email, missing hash and wrong password all yield
    /// [`AuthError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let credentials = self
            .employees
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let matches = credentials
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(hash, password));
        if !matches {
            debug!(employee_id = credentials.employee.id, "password rejected");
            return Err(AuthError::InvalidCredentials);
        }

        self.tokens.issue(&credentials.employee)
    }

    /// Resolve a bearer token to the current employee record.
    pub async fn authorize(&self, token: &str) -> Result<Employee, AuthError> {
        let claims = self.tokens.verify(token)?;
        match self.employees.get(claims.id).await {
            Ok(employee) => Ok(employee),
            Err(flow_core::Error::EmployeeNotFound(id)) => Err(AuthError::InvalidToken(format!(
                "employee {} no longer exists",
                id
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

fn required(value: &str, field: &str) -> Result<String, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}
