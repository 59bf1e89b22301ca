use serde::Serialize;

use crate::{
    constants::DISTRIBUTION_BUCKETS,
    db::{Database, RoundAggregates},
    error::Result,
};

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Share of `part` in `total` as a percentage with two decimals; zero when `total` is zero.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 2)
}

/// Zero-based index of the lower median in a sorted list of `count` values.
pub fn lower_median_index(count: i64) -> i64 {
    count.max(0) / 2
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_games: i64,
    pub avg_lanes_crossed: f64,
    pub avg_multiplier: f64,
    pub success_rate: f64,
    pub max_lanes_crossed: i32,
    pub median_lanes_crossed: f64,
    pub total_hits: i64,
    pub total_crossed: i64,
}

impl SummaryStats {
    pub fn from_aggregates(agg: &RoundAggregates, median_lanes: Option<i32>) -> Self {
        Self {
            total_games: agg.total,
            avg_lanes_crossed: round_to(agg.avg_lanes.unwrap_or(0.0), 4),
            avg_multiplier: round_to(agg.avg_multiplier.unwrap_or(0.0), 4),
            success_rate: percentage(agg.total_crossed, agg.total),
            max_lanes_crossed: agg.max_lanes.unwrap_or(0),
            median_lanes_crossed: round_to(f64::from(median_lanes.unwrap_or(0)), 4),
            total_hits: agg.total_hits,
            total_crossed: agg.total_crossed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentStats {
    pub sample_size: i64,
    pub avg_lanes_crossed: f64,
    pub avg_multiplier: f64,
    pub success_rate: f64,
}

impl RecentStats {
    pub fn from_aggregates(agg: &RoundAggregates) -> Self {
        Self {
            sample_size: agg.total,
            avg_lanes_crossed: round_to(agg.avg_lanes.unwrap_or(0.0), 4),
            avg_multiplier: round_to(agg.avg_multiplier.unwrap_or(0.0), 4),
            success_rate: percentage(agg.total_crossed, agg.total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub range: String,
    pub count: i64,
    pub percentage: f64,
}

/// Build the bucket list from per-bucket counts, in `DISTRIBUTION_BUCKETS` order.
pub fn distribution_from_counts(counts: &[i64], total: i64) -> Vec<DistributionBucket> {
    // an empty table still yields every bucket at 0%
    let denominator = total.max(1);
    DISTRIBUTION_BUCKETS
        .iter()
        .zip(counts)
        .map(|((label, _, _), &count)| DistributionBucket {
            range: label.to_string(),
            count,
            percentage: percentage(count, denominator),
        })
        .collect()
}

/// Read-only aggregation over persisted rounds.
pub struct StatsService {
    db: Database,
}

impl StatsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn summary(&self) -> Result<SummaryStats> {
        let agg = self.db.aggregate_all().await?;
        let median = if agg.total > 0 {
            self.db.lanes_at_rank(lower_median_index(agg.total)).await?
        } else {
            None
        };
        Ok(SummaryStats::from_aggregates(&agg, median))
    }

    pub async fn recent(&self, limit: i64) -> Result<RecentStats> {
        let agg = self.db.aggregate_recent(limit).await?;
        Ok(RecentStats::from_aggregates(&agg))
    }

    pub async fn distribution(&self) -> Result<Vec<DistributionBucket>> {
        let total = self.db.count_rounds().await?;
        let mut counts = Vec::with_capacity(DISTRIBUTION_BUCKETS.len());
        for (_, min, max) in DISTRIBUTION_BUCKETS {
            counts.push(self.db.count_rounds_in_lane_range(*min, *max).await?);
        }
        tracing::debug!("Distribution calculated for {} rounds", total);
        Ok(distribution_from_counts(&counts, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_empty_total() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn lower_median_index_matches_offset_query() {
        assert_eq!(lower_median_index(0), 0);
        assert_eq!(lower_median_index(1), 0);
        assert_eq!(lower_median_index(4), 2);
        assert_eq!(lower_median_index(5), 2);
    }

    #[test]
    fn summary_rounds_averages_and_rates() {
        let agg = RoundAggregates {
            total: 3,
            avg_lanes: Some(10.0 / 3.0),
            avg_multiplier: Some(1.234567),
            max_lanes: Some(6),
            total_hits: 2,
            total_crossed: 1,
        };
        let summary = SummaryStats::from_aggregates(&agg, Some(3));
        assert_eq!(summary.avg_lanes_crossed, 3.3333);
        assert_eq!(summary.avg_multiplier, 1.2346);
        assert_eq!(summary.success_rate, 33.33);
        assert_eq!(summary.median_lanes_crossed, 3.0);
        assert_eq!(summary.max_lanes_crossed, 6);
    }

    #[test]
    fn summary_of_empty_table_is_zeroed() {
        let summary = SummaryStats::from_aggregates(&RoundAggregates::default(), None);
        assert_eq!(summary.total_games, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.median_lanes_crossed, 0.0);
    }

    #[test]
    fn distribution_lists_every_bucket() {
        let buckets = distribution_from_counts(&[1, 2, 1, 0, 0, 0], 4);
        assert_eq!(buckets.len(), DISTRIBUTION_BUCKETS.len());
        assert_eq!(buckets[0].range, "1 lane");
        assert_eq!(buckets[1].percentage, 50.0);
        assert_eq!(buckets[5].range, "10+ lanes");

        let empty = distribution_from_counts(&[0; 6], 0);
        assert!(empty.iter().all(|b| b.count == 0 && b.percentage == 0.0));
    }
}
