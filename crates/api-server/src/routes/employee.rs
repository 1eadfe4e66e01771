//! Employee API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use flow_core::employee::{AccessLevel, Employee, EmployeeUpdate, NewEmployee};

use super::error::{bad_request, map_auth_error, map_core_error, required_text, RouteError};
use crate::auth::password::{hash_password, validate_password};
use crate::auth::{ensure_access, Caller};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "cargo")]
    pub title: String,
    pub email: String,
    #[serde(rename = "nivel_acesso")]
    pub access_level: AccessLevel,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name,
            title: employee.title,
            email: employee.email,
            access_level: employee.access_level,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateEmployeeRequest {
    #[serde(rename = "nome")]
    name: String,
    #[serde(rename = "cargo")]
    title: String,
    email: String,
    #[serde(default, rename = "senha")]
    password: Option<String>,
    #[serde(default, rename = "nivel_acesso")]
    access_level: Option<AccessLevel>,
}

#[derive(Debug, Deserialize)]
struct UpdateEmployeeRequest {
    #[serde(default, rename = "nome")]
    name: Option<String>,
    #[serde(default, rename = "cargo")]
    title: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default, rename = "senha")]
    password: Option<String>,
    #[serde(default, rename = "nivel_acesso")]
    access_level: Option<AccessLevel>,
}

fn new_password_hash(password: Option<&str>) -> Result<Option<String>, RouteError> {
    password
        .map(|password| {
            validate_password(password).map_err(map_auth_error)?;
            Ok(hash_password(password))
        })
        .transpose()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /empregados/ - admins see everyone, users only themselves
async fn list_employees(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<EmployeeResponse>>, RouteError> {
    let employees = match caller.restricted_to() {
        Some(own_id) => vec![state.employees().get(own_id).await.map_err(map_core_error)?],
        None => state.employees().list().await.map_err(map_core_error)?,
    };

    Ok(Json(employees.into_iter().map(EmployeeResponse::from).collect()))
}

/// POST /empregados/ - admin-only creation
async fn create_employee(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), RouteError> {
    ensure_access(&caller, None, AccessLevel::Admin).map_err(map_auth_error)?;

    let mut employee = NewEmployee::new(
        required_text(&req.name, "Name")?,
        required_text(&req.title, "Title")?,
        req.email,
    );
    if let Some(hash) = new_password_hash(req.password.as_deref())? {
        employee = employee.with_password_hash(hash);
    }
    if let Some(access_level) = req.access_level {
        employee = employee.with_access_level(access_level);
    }

    let created = state
        .employees()
        .create(employee)
        .await
        .map_err(map_core_error)?;

    Ok((StatusCode::CREATED, Json(EmployeeResponse::from(created))))
}

/// GET /empregados/:id
async fn get_employee(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<Json<EmployeeResponse>, RouteError> {
    ensure_access(&caller, Some(id), AccessLevel::User).map_err(map_auth_error)?;

    let employee = state.employees().get(id).await.map_err(map_core_error)?;
    Ok(Json(EmployeeResponse::from(employee)))
}

/// PUT /empregados/:id - partial update; only admins change access levels
async fn update_employee(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, RouteError> {
    ensure_access(&caller, Some(id), AccessLevel::User).map_err(map_auth_error)?;
    if req.access_level.is_some() {
        ensure_access(&caller, Some(id), AccessLevel::Admin).map_err(map_auth_error)?;
    }

    let update = EmployeeUpdate {
        name: req
            .name
            .as_deref()
            .map(|name| required_text(name, "Name"))
            .transpose()?,
        title: req
            .title
            .as_deref()
            .map(|title| required_text(title, "Title"))
            .transpose()?,
        email: req.email,
        password_hash: new_password_hash(req.password.as_deref())?,
        access_level: req.access_level,
    };
    if update.is_empty() {
        return Err(bad_request("No fields to update"));
    }

    let updated = state
        .employees()
        .update(id, update)
        .await
        .map_err(map_core_error)?;

    Ok(Json(EmployeeResponse::from(updated)))
}

/// DELETE /empregados/:id - admin-only; the employee's tasks become unassigned
async fn delete_employee(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i64>,
) -> Result<StatusCode, RouteError> {
    ensure_access(&caller, None, AccessLevel::Admin).map_err(map_auth_error)?;

    state.employees().delete(id).await.map_err(map_core_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/empregados/", get(list_employees).post(create_employee))
        .route(
            "/empregados/{id}",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
}
