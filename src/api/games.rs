use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::{
    constants::{GAMES_DEFAULT_LIMIT, GAMES_MAX_LIMIT},
    error::Result,
    models::{ApiResponse, PaginatedResponse, RoundRecord},
    utils::ensure_in_range,
};

#[derive(Debug, Default, Deserialize)]
pub struct GamesQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl GamesQuery {
    fn bounds(&self) -> Result<(i64, i64)> {
        let limit = ensure_in_range(
            "limit",
            self.limit.unwrap_or(GAMES_DEFAULT_LIMIT),
            1,
            GAMES_MAX_LIMIT,
        )?;
        let offset = ensure_in_range("offset", self.offset.unwrap_or(0), 0, i64::MAX)?;
        Ok((limit, offset))
    }
}

/// GET /api/games
pub async fn list_games(
    State(state): State<AppState>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<ApiResponse<PaginatedResponse<RoundRecord>>>> {
    let (limit, offset) = query.bounds()?;

    let total = state.db.count_rounds().await?;
    let items = state.db.list_rounds(limit, offset).await?;
    tracing::debug!("Retrieved {} rounds (total: {})", items.len(), total);

    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        limit,
        offset,
        total,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_default_to_first_page() {
        assert_eq!(GamesQuery::default().bounds().unwrap(), (50, 0));
    }

    #[test]
    fn bounds_reject_oversized_limit_and_negative_offset() {
        let query = GamesQuery {
            limit: Some(501),
            offset: None,
        };
        assert!(query.bounds().is_err());

        let query = GamesQuery {
            limit: Some(10),
            offset: Some(-5),
        };
        assert!(query.bounds().is_err());
    }
}
