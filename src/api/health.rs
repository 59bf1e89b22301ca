use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::constants::{GAME_NAME, GAME_PROVIDER, GAME_RTP};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub game: String,
    pub provider: String,
    pub rtp: String,
    pub database: String,
    pub last_data_update: Option<String>,
    pub timestamp: String,
}

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database, last_data_update) = match state.db.latest_recorded_at().await {
        Ok(latest) => (
            "healthy",
            "connected",
            Some(
                latest
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "No data".to_string()),
            ),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ("unhealthy", "disconnected", None)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        game: GAME_NAME.to_string(),
        provider: GAME_PROVIDER.to_string(),
        rtp: GAME_RTP.to_string(),
        database: database.to_string(),
        last_data_update,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
