//! API Server for Flow Scheduler
//!
//! Serves the employee and task REST API over a SQLite store.

mod auth;
mod config;
mod feature_flags;
mod routes;
mod state;

use anyhow::Context;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flow_core::Database;

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,flow_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    tracing::info!("Using data directory: {:?}", config.data_dir);
    tracing::info!("Using database: {:?}", config.database_path);

    if config.auth_enabled {
        if config.uses_default_secret() {
            tracing::warn!(
                "FLOW_JWT_SECRET is not set; tokens are signed with the development secret"
            );
        }
    } else {
        tracing::warn!("Authorization is disabled; every request is unrestricted");
    }

    let db = Database::open_with_retry(
        &config.database_config(),
        config.db_connect_retries,
        config.db_retry_delay,
    )
    .await
    .context("Failed to open database")?;

    let app_state = AppState::new(db, &config);
    let app = routes::router(app_state)
        .layer(config.cors_layer()?)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
