use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{CompletedRound, RoundRecord},
};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Aggregate row backing the summary and recent stats endpoints.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct RoundAggregates {
    pub total: i64,
    pub avg_lanes: Option<f64>,
    pub avg_multiplier: Option<f64>,
    pub max_lanes: Option<i32>,
    pub total_hits: i64,
    pub total_crossed: i64,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        // migrations live at the crate root: ./migrations
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// ==================== ROUND WRITES ====================
impl Database {
    /// Returns whether a new row was written; a known `round_id` is left untouched.
    pub async fn insert_round_if_absent(&self, round: &CompletedRound) -> Result<bool> {
        let lanes = i32::try_from(round.lanes_crossed).map_err(|_| {
            AppError::Internal(format!(
                "lanes_crossed {} out of range for round {}",
                round.lanes_crossed, round.round_id
            ))
        })?;

        let result = sqlx::query(
            "INSERT INTO chickenroad_rounds
                (round_id, lanes_crossed, final_multiplier, outcome, provenance_hash)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (round_id) DO NOTHING",
        )
        .bind(&round.round_id)
        .bind(lanes)
        .bind(round.final_multiplier)
        .bind(round.outcome.as_str())
        .bind(round.provenance_hash.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// ==================== ROUND READS ====================
impl Database {
    pub async fn count_rounds(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM chickenroad_rounds")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_rounds(&self, limit: i64, offset: i64) -> Result<Vec<RoundRecord>> {
        let rows = sqlx::query_as::<_, RoundRecord>(
            "SELECT round_id, lanes_crossed, final_multiplier, outcome, provenance_hash, recorded_at
             FROM chickenroad_rounds
             ORDER BY recorded_at DESC, id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn aggregate_all(&self) -> Result<RoundAggregates> {
        let row = sqlx::query_as::<_, RoundAggregates>(
            "SELECT
                COUNT(*) AS total,
                AVG(lanes_crossed)::FLOAT8 AS avg_lanes,
                AVG(final_multiplier)::FLOAT8 AS avg_multiplier,
                MAX(lanes_crossed) AS max_lanes,
                COUNT(*) FILTER (WHERE outcome = 'hit') AS total_hits,
                COUNT(*) FILTER (WHERE outcome = 'crossed') AS total_crossed
             FROM chickenroad_rounds",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn aggregate_recent(&self, limit: i64) -> Result<RoundAggregates> {
        let row = sqlx::query_as::<_, RoundAggregates>(
            "SELECT
                COUNT(*) AS total,
                AVG(lanes_crossed)::FLOAT8 AS avg_lanes,
                AVG(final_multiplier)::FLOAT8 AS avg_multiplier,
                MAX(lanes_crossed) AS max_lanes,
                COUNT(*) FILTER (WHERE outcome = 'hit') AS total_hits,
                COUNT(*) FILTER (WHERE outcome = 'crossed') AS total_crossed
             FROM (
                SELECT lanes_crossed, final_multiplier, outcome
                FROM chickenroad_rounds
                ORDER BY recorded_at DESC, id DESC
                LIMIT $1
             ) recent",
        )
        .bind(limit)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Lanes value at zero-based position `index` of the ascending order.
    pub async fn lanes_at_rank(&self, index: i64) -> Result<Option<i32>> {
        let lanes = sqlx::query_scalar(
            "SELECT lanes_crossed FROM chickenroad_rounds
             ORDER BY lanes_crossed ASC
             LIMIT 1 OFFSET $1",
        )
        .bind(index)
        .fetch_optional(&self.pool)
        .await?;
        Ok(lanes)
    }

    pub async fn count_rounds_in_lane_range(&self, min: i32, max: Option<i32>) -> Result<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chickenroad_rounds
             WHERE lanes_crossed >= $1 AND ($2::INT IS NULL OR lanes_crossed <= $2)",
        )
        .bind(min)
        .bind(max)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn latest_recorded_at(&self) -> Result<Option<DateTime<Utc>>> {
        let latest = sqlx::query_scalar("SELECT MAX(recorded_at) FROM chickenroad_rounds")
            .fetch_one(&self.pool)
            .await?;
        Ok(latest)
    }
}
