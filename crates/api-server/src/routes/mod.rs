//! Route handlers

use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod employee;
pub mod error;
pub mod health;
pub mod task;

#[cfg(test)]
pub(crate) mod test_support;

/// All REST routes bound to the shared state
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(employee::router())
        .merge(task::router())
        .with_state(state)
}
