//! Server configuration read from the environment at startup

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use flow_core::DatabaseConfig;

use crate::feature_flags::{parse_flag, FEATURE_AUTH};

pub const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_CONNECT_RETRIES: u32 = 5;
const DEFAULT_RETRY_DELAY_SECONDS: u64 = 5;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:8000",
    "http://127.0.0.1:8000",
    "http://127.0.0.1:5500",
    "https://flowscheduler-app.onrender.com",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_seconds: i64,
    pub cors_origins: CorsOrigins,
    pub db_pool_size: u32,
    pub db_connect_retries: u32,
    pub db_retry_delay: Duration,
    pub auth_enabled: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let data_dir = value("FLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".flow-data"));
        let database_path = value("FLOW_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("flow.db"));

        let ip: IpAddr = match value("FLOW_BIND_ADDR") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("FLOW_BIND_ADDR '{}' is not an IP address", raw))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = parse_or("PORT", value("PORT"), DEFAULT_PORT)?;

        let cors_origins = match value("FLOW_CORS_ORIGINS") {
            Some(raw) if raw == "*" => CorsOrigins::Any,
            Some(raw) => CorsOrigins::List(
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect(),
            ),
            None => CorsOrigins::List(DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()),
        };

        Ok(Self {
            data_dir,
            database_path,
            bind_addr: SocketAddr::new(ip, port),
            jwt_secret: value("FLOW_JWT_SECRET").unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string()),
            token_ttl_seconds: parse_or(
                "FLOW_TOKEN_TTL_SECONDS",
                value("FLOW_TOKEN_TTL_SECONDS"),
                DEFAULT_TOKEN_TTL_SECONDS,
            )?,
            cors_origins,
            db_pool_size: parse_or("FLOW_DB_POOL_SIZE", value("FLOW_DB_POOL_SIZE"), DEFAULT_POOL_SIZE)?
                .max(1),
            db_connect_retries: parse_or(
                "FLOW_DB_CONNECT_RETRIES",
                value("FLOW_DB_CONNECT_RETRIES"),
                DEFAULT_CONNECT_RETRIES,
            )?,
            db_retry_delay: Duration::from_secs(parse_or(
                "FLOW_DB_RETRY_DELAY_SECONDS",
                value("FLOW_DB_RETRY_DELAY_SECONDS"),
                DEFAULT_RETRY_DELAY_SECONDS,
            )?),
            auth_enabled: parse_flag(lookup(FEATURE_AUTH).as_deref(), true),
        })
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_path.clone()).with_pool_size(self.db_pool_size)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn cors_layer(&self) -> anyhow::Result<CorsLayer> {
        let allow_origin = match &self.cors_origins {
            CorsOrigins::Any => AllowOrigin::from(Any),
            CorsOrigins::List(origins) => {
                let origins = origins
                    .iter()
                    .map(|origin| {
                        HeaderValue::from_str(origin)
                            .map_err(|_| anyhow!("Invalid CORS origin '{}'", origin))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                AllowOrigin::list(origins)
            }
        };

        Ok(CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has invalid value '{}'", name, raw)),
        None => Ok(default),
    }
}
