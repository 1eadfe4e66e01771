//! Service banner and health check

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::feature_flags::FeatureFlagsSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
struct BannerResponse {
    message: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    version: String,
    features: FeatureFlagsSnapshot,
}

async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Flow Scheduler API is online",
    })
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: state.feature_flags(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
}
