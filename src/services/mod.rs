// All service modules
pub mod round_stats;

// Re-export for convenience
pub use round_stats::StatsService;
