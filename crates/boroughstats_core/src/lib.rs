//! Query and aggregation engine for daily borough health records.
//! This crate is the single source of truth for window, lookup and
//! aggregation semantics; front-ends only render its results.

pub mod loader;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use loader::{parse_csv, CsvFileSource, LoadError, LoadResult, RecordSource, VecSource};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::record::{Metric, Mobility, Record, UNKNOWN_SENTINEL};
pub use model::region::{borough_code, borough_name, BOROUGHS};
pub use repo::record_repo::{MissingBound, RecordRepository, RepoError, RepoResult};
pub use service::dashboard_service::{
    sort_records, ComparisonPoint, ComparisonSeries, DashboardService, RangeStatus,
    RegionDeathBand, ServiceError, ServiceResult, SortKey,
};
pub use stats::aggregate::{
    mean_parks_mobility, mean_total_cases, mean_transit_mobility, summarize, sum_total_deaths,
    WindowStats, WindowSummary,
};
pub use stats::band::DeathBand;
pub use stats::compare::{region_total, ComparisonMetric};
pub use stats::latest::{latest_known, latest_known_total_deaths};
pub use stats::{StatsError, StatsResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
