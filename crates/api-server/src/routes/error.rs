//! Error responses shared by the route modules

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

pub fn unauthorized() -> RouteError {
    route_error(StatusCode::UNAUTHORIZED, "unauthorized")
}

pub fn forbidden(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::FORBIDDEN, error)
}

pub fn internal_error(error: impl std::fmt::Display) -> RouteError {
    error!(error = %error, "request failed");
    route_error(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

/// Trimmed value of a required text field
pub fn required_text(value: &str, field: &str) -> Result<String, RouteError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub fn map_core_error(err: flow_core::Error) -> RouteError {
    use flow_core::Error;

    let status = match &err {
        Error::EmployeeNotFound(_) | Error::TaskNotFound(_) | Error::UnknownEmployee(_) => {
            StatusCode::NOT_FOUND
        }
        Error::DuplicateEmail(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Storage(_) => return internal_error(&err),
    };
    route_error(status, err.to_string())
}

pub fn map_auth_error(err: AuthError) -> RouteError {
    let status = match &err {
        AuthError::InvalidInput(_)
        | AuthError::DuplicateEmail(_)
        | AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
        AuthError::InvalidToken(_) | AuthError::Expired => return unauthorized(),
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::Storage(_) => return internal_error(&err),
    };
    route_error(status, err.to_string())
}
