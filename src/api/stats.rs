use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    constants::{RECENT_DEFAULT_LIMIT, RECENT_MAX_LIMIT},
    error::Result,
    models::ApiResponse,
    services::{
        round_stats::{DistributionBucket, RecentStats, SummaryStats},
        StatsService,
    },
    utils::ensure_in_range,
};

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// GET /api/stats/summary
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<ApiResponse<SummaryStats>>> {
    let summary = StatsService::new(state.db.clone()).summary().await?;
    tracing::debug!("Summary stats: {} total rounds", summary.total_games);
    Ok(Json(ApiResponse::success(summary)))
}

/// GET /api/stats/recent
pub async fn get_recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<ApiResponse<RecentStats>>> {
    let limit = ensure_in_range(
        "limit",
        query.limit.unwrap_or(RECENT_DEFAULT_LIMIT),
        1,
        RECENT_MAX_LIMIT,
    )?;
    let recent = StatsService::new(state.db.clone()).recent(limit).await?;
    Ok(Json(ApiResponse::success(recent)))
}

/// GET /api/distribution
pub async fn get_distribution(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DistributionBucket>>>> {
    let buckets = StatsService::new(state.db.clone()).distribution().await?;
    Ok(Json(ApiResponse::success(buckets)))
}
