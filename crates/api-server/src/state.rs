//! Application state

use std::sync::Arc;

use flow_core::employee::{EmployeeRepository, SqliteEmployeeStore};
use flow_core::task::{SqliteTaskStore, TaskRepository};
use flow_core::Database;

use crate::auth::{AuthService, TokenIssuer};
use crate::config::ServerConfig;
use crate::feature_flags::FeatureFlagsSnapshot;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    employees: Arc<dyn EmployeeRepository>,
    tasks: Arc<dyn TaskRepository>,
    auth: AuthService,
    auth_enabled: bool,
}

impl AppState {
    /// Build the SQLite-backed repositories over an open database
    pub fn new(db: Database, config: &ServerConfig) -> Self {
        Self::with_repositories(
            Arc::new(SqliteEmployeeStore::new(db.clone())),
            Arc::new(SqliteTaskStore::new(db)),
            TokenIssuer::new(config.jwt_secret.clone(), config.token_ttl_seconds),
            config.auth_enabled,
        )
    }

    pub fn with_repositories(
        employees: Arc<dyn EmployeeRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenIssuer,
        auth_enabled: bool,
    ) -> Self {
        let auth = AuthService::new(Arc::clone(&employees), tokens);
        Self {
            inner: Arc::new(AppStateInner {
                employees,
                tasks,
                auth,
                auth_enabled,
            }),
        }
    }

    pub fn employees(&self) -> &dyn EmployeeRepository {
        self.inner.employees.as_ref()
    }

    pub fn tasks(&self) -> &dyn TaskRepository {
        self.inner.tasks.as_ref()
    }

    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    pub fn auth_enabled(&self) -> bool {
        self.inner.auth_enabled
    }

    pub fn feature_flags(&self) -> FeatureFlagsSnapshot {
        FeatureFlagsSnapshot {
            auth: self.inner.auth_enabled,
        }
    }
}
