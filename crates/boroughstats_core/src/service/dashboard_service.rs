//! Dashboard session service.
//!
//! # Responsibility
//! - Validate the selected date range against dataset coverage.
//! - Own the explicit "current region selection" used by table views.
//! - Build plain-data results for the stats panel, comparison chart and map.
//!
//! # Invariants
//! - The window is only recomputed for a `RangeStatus::Valid` range.
//! - The selection is replaced only by a successful `select_region` call.
//! - Chart values are display-scaled here; repository totals stay raw.

use crate::model::record::Record;
use crate::model::region::BOROUGHS;
use crate::repo::record_repo::{RecordRepository, RepoError};
use crate::stats::aggregate::WindowSummary;
use crate::stats::band::DeathBand;
use crate::stats::compare::ComparisonMetric;
use crate::stats::StatsError;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome of checking the selected bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RangeStatus {
    /// At least one bound is missing and every set bound is valid.
    NotSelected,
    /// The from date is not present in the dataset.
    UnknownStart { from: NaiveDate },
    /// The to date is not present in the dataset.
    UnknownEnd { to: NaiveDate },
    StartAfterEnd { from: NaiveDate, to: NaiveDate },
    Valid { from: NaiveDate, to: NaiveDate },
}

impl Display for RangeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSelected => write!(f, "date range not selected"),
            Self::UnknownStart { from } => write!(f, "start date {from} is not in the dataset"),
            Self::UnknownEnd { to } => write!(f, "end date {to} is not in the dataset"),
            Self::StartAfterEnd { from, to } => {
                write!(f, "start date {from} is after end date {to}")
            }
            Self::Valid { from, to } => write!(f, "{from} - {to}"),
        }
    }
}

/// Errors from dashboard use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Repo(RepoError),
    /// `apply_range` called while the range is not valid.
    InvalidRange(RangeStatus),
    /// Comparison requested between a region and itself.
    SameRegion(String),
    /// Selection read before any region was selected.
    NoSelection,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::InvalidRange(status) => write!(f, "invalid date range: {status}"),
            Self::SameRegion(region) => {
                write!(f, "cannot compare region `{region}` with itself")
            }
            Self::NoSelection => write!(f, "no region has been selected"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidRange(_) | Self::SameRegion(_) | Self::NoSelection => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Table sort options; every key sorts descending with unknowns last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    NewCases,
    TotalCases,
    NewDeaths,
    /// Mean of the known mobility categories.
    Mobility,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "date" => Ok(Self::Date),
            "new_cases" => Ok(Self::NewCases),
            "total_cases" => Ok(Self::TotalCases),
            "new_deaths" => Ok(Self::NewDeaths),
            "mobility" | "google_mobility_data" => Ok(Self::Mobility),
            other => Err(format!(
                "unsupported sort key `{other}`; expected date|new_cases|total_cases|new_deaths|mobility"
            )),
        }
    }
}

/// One bar in a comparison series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonPoint {
    pub region: String,
    pub raw_total: u64,
    pub display_value: u64,
}

/// One chart series: a metric across the compared regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonSeries {
    pub metric: ComparisonMetric,
    pub label: &'static str,
    pub points: Vec<ComparisonPoint>,
}

/// Map tile state for one borough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionDeathBand {
    pub code: &'static str,
    pub region: &'static str,
    pub latest_total_deaths: Option<u64>,
    pub band: DeathBand,
}

#[derive(Debug, Clone)]
struct RegionSelection {
    region: String,
    use_window: bool,
    positions: Vec<usize>,
}

/// Session-level wrapper around a loaded repository.
#[derive(Debug)]
pub struct DashboardService {
    repo: RecordRepository,
    selection: Option<RegionSelection>,
}

impl DashboardService {
    pub fn new(repo: RecordRepository) -> Self {
        Self {
            repo,
            selection: None,
        }
    }

    pub fn repo(&self) -> &RecordRepository {
        &self.repo
    }

    pub fn set_from_date(&mut self, date: NaiveDate) {
        self.repo.set_from_date(date);
    }

    pub fn set_to_date(&mut self, date: NaiveDate) {
        self.repo.set_to_date(date);
    }

    /// Checks the stored bounds against dataset coverage and ordering.
    pub fn range_status(&self) -> ServiceResult<RangeStatus> {
        let from = self.repo.from_date();
        let to = self.repo.to_date();

        if let Some(from) = from {
            if !self.repo.is_valid_date(from)? {
                return Ok(RangeStatus::UnknownStart { from });
            }
        }
        if let Some(to) = to {
            if !self.repo.is_valid_date(to)? {
                return Ok(RangeStatus::UnknownEnd { to });
            }
        }
        let status = match (from, to) {
            (Some(from), Some(to)) if from > to => RangeStatus::StartAfterEnd { from, to },
            (Some(from), Some(to)) => RangeStatus::Valid { from, to },
            _ => RangeStatus::NotSelected,
        };
        Ok(status)
    }

    /// Header text describing the current range.
    pub fn range_label(&self) -> ServiceResult<String> {
        let label = match self.range_status()? {
            RangeStatus::Valid { from, to } => format!("{from} - {to}"),
            RangeStatus::NotSelected => "Date Range: [Not Selected]".to_string(),
            RangeStatus::UnknownStart { .. }
            | RangeStatus::UnknownEnd { .. }
            | RangeStatus::StartAfterEnd { .. } => {
                "Date Range: [Invalid range selected]".to_string()
            }
        };
        Ok(label)
    }

    /// Recomputes the window when the range is valid.
    ///
    /// Returns the number of records in the new window.
    ///
    /// # Errors
    /// - `ServiceError::InvalidRange` carrying the failing status.
    pub fn apply_range(&mut self) -> ServiceResult<usize> {
        let status = self.range_status()?;
        if !matches!(status, RangeStatus::Valid { .. }) {
            warn!("event=service_range module=service status=rejected reason={status}");
            return Err(ServiceError::InvalidRange(status));
        }
        let rows = self.repo.recompute_window()?;
        info!("event=service_range module=service status=ok rows={rows}");
        Ok(rows)
    }

    /// Filters `region` and stores the result as the current selection.
    pub fn select_region(&mut self, region: &str, use_window: bool) -> ServiceResult<Vec<&Record>> {
        let positions = self.repo.region_positions(region, use_window)?;
        let selection = self.selection.insert(RegionSelection {
            region: region.to_string(),
            use_window,
            positions,
        });
        Ok(self.repo.records_at(&selection.positions)?)
    }

    /// Region name and scope of the current selection.
    pub fn selected_region(&self) -> Option<(&str, bool)> {
        self.selection
            .as_ref()
            .map(|selection| (selection.region.as_str(), selection.use_window))
    }

    /// Records of the current selection, in canonical order.
    pub fn selection(&self) -> ServiceResult<Vec<&Record>> {
        let selection = self.selection.as_ref().ok_or(ServiceError::NoSelection)?;
        Ok(self.repo.records_at(&selection.positions)?)
    }

    /// Current selection sorted by `key`, descending, unknowns last.
    pub fn sorted_selection(&self, key: SortKey) -> ServiceResult<Vec<&Record>> {
        let mut records = self.selection()?;
        sort_records(&mut records, key);
        Ok(records)
    }

    /// Aggregates shown on the statistics panel.
    pub fn stats_panel(&self) -> ServiceResult<WindowSummary> {
        Ok(self.repo.window_summary()?)
    }

    /// Builds one chart series per metric for two different regions.
    ///
    /// # Errors
    /// - `ServiceError::SameRegion` when both names are equal.
    /// - `RepoError::WindowNotSet` before a window exists.
    pub fn compare_regions(
        &self,
        first: &str,
        second: &str,
        metrics: &[ComparisonMetric],
    ) -> ServiceResult<Vec<ComparisonSeries>> {
        if first == second {
            return Err(ServiceError::SameRegion(first.to_string()));
        }

        let mut series = Vec::with_capacity(metrics.len());
        for &metric in metrics {
            let mut points = Vec::with_capacity(2);
            for region in [first, second] {
                let raw_total = self.repo.region_total(region, metric)?;
                points.push(ComparisonPoint {
                    region: region.to_string(),
                    raw_total,
                    display_value: metric.scale_for_display(raw_total),
                });
            }
            series.push(ComparisonSeries {
                metric,
                label: metric.label(),
                points,
            });
        }
        Ok(series)
    }

    /// Newest known total deaths and band for every borough on the map.
    pub fn map_overview(&self) -> ServiceResult<Vec<RegionDeathBand>> {
        BOROUGHS
            .iter()
            .map(|&(code, region)| {
                let latest_total_deaths = match self.repo.latest_known_total_deaths(region) {
                    Ok(value) => Some(value),
                    Err(RepoError::Stats(StatsError::NoKnownValue)) => None,
                    Err(err) => return Err(ServiceError::from(err)),
                };
                let band = latest_total_deaths
                    .map(DeathBand::classify)
                    .unwrap_or(DeathBand::Unclassified);
                Ok(RegionDeathBand {
                    code,
                    region,
                    latest_total_deaths,
                    band,
                })
            })
            .collect()
    }
}

/// Sorts records descending by `key`; unknown values go last, ties keep order.
pub fn sort_records(records: &mut [&Record], key: SortKey) {
    match key {
        SortKey::Date => records.sort_by(|a, b| b.date.cmp(&a.date)),
        SortKey::NewCases => records.sort_by(|a, b| descending(a.new_cases, b.new_cases, Ord::cmp)),
        SortKey::TotalCases => {
            records.sort_by(|a, b| descending(a.total_cases, b.total_cases, Ord::cmp))
        }
        SortKey::NewDeaths => {
            records.sort_by(|a, b| descending(a.new_deaths, b.new_deaths, Ord::cmp))
        }
        SortKey::Mobility => records.sort_by(|a, b| {
            descending(a.average_mobility(), b.average_mobility(), f64::total_cmp)
        }),
    }
}

fn descending<T>(a: Option<T>, b: Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp(&b, &a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::{descending, SortKey};
    use std::cmp::Ordering;

    #[test]
    fn sort_key_accepts_table_labels() {
        assert_eq!("New cases".parse(), Ok(SortKey::NewCases));
        assert_eq!("Google mobility data".parse(), Ok(SortKey::Mobility));
        assert_eq!("total-cases".parse(), Ok(SortKey::TotalCases));
        assert!("residential".parse::<SortKey>().is_err());
    }

    #[test]
    fn descending_puts_unknowns_last() {
        assert_eq!(descending(Some(1), Some(2), Ord::cmp), Ordering::Greater);
        assert_eq!(descending(Some(1), None, Ord::cmp), Ordering::Less);
        assert_eq!(descending::<u64>(None, Some(1), Ord::cmp), Ordering::Greater);
    }
}
