//! In-memory record repository: load, window and region queries.
//!
//! # Responsibility
//! - Own the canonical record set for the lifetime of the process.
//! - Hold the selected date window and recompute it on request.
//! - Answer region filters, coverage checks and window aggregates.
//!
//! # Invariants
//! - Records load at most once; a failed load leaves the repository unloaded.
//! - The window is recomputed only by `recompute_window`, never lazily.
//! - Derived subsets are positions into (or borrows of) the canonical set.
//! - Queries return fresh values; no "last filtered" state is retained here.

use crate::loader::{LoadError, RecordSource};
use crate::model::record::{Metric, Record};
use crate::repo::region_index::RegionIndex;
use crate::stats::aggregate::{summarize, WindowSummary};
use crate::stats::compare::{region_total, ComparisonMetric};
use crate::stats::StatsError;
use chrono::NaiveDate;
use log::{debug, error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Window bound(s) missing when a recompute was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingBound {
    From,
    To,
    Both,
}

impl Display for MissingBound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::From => write!(f, "from date"),
            Self::To => write!(f, "to date"),
            Self::Both => write!(f, "from and to dates"),
        }
    }
}

/// Repository error for load and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Query issued before a successful load.
    NotLoaded,
    /// `load` called on a repository that already holds records.
    AlreadyLoaded,
    Load(LoadError),
    /// Window-scoped query issued before any `recompute_window`.
    WindowNotSet,
    IncompleteRange { missing: MissingBound },
    Stats(StatsError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "records have not been loaded"),
            Self::AlreadyLoaded => write!(f, "records are already loaded"),
            Self::Load(err) => write!(f, "{err}"),
            Self::WindowNotSet => write!(f, "date window has not been computed"),
            Self::IncompleteRange { missing } => {
                write!(f, "cannot compute window: missing {missing}")
            }
            Self::Stats(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Stats(err) => Some(err),
            Self::NotLoaded
            | Self::AlreadyLoaded
            | Self::WindowNotSet
            | Self::IncompleteRange { .. } => None,
        }
    }
}

impl From<LoadError> for RepoError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<StatsError> for RepoError {
    fn from(value: StatsError) -> Self {
        Self::Stats(value)
    }
}

/// Canonical records plus lookups built once after load.
#[derive(Debug)]
struct Dataset {
    records: Vec<Record>,
    dates: HashSet<NaiveDate>,
    regions: Vec<String>,
    index: RegionIndex,
}

impl Dataset {
    fn new(records: Vec<Record>) -> Self {
        let dates: HashSet<NaiveDate> = records.iter().map(|record| record.date).collect();
        let regions: Vec<String> = {
            let mut seen = HashSet::new();
            records
                .iter()
                .filter(|record| seen.insert(record.region.as_str()))
                .map(|record| record.region.clone())
                .collect()
        };
        let index = RegionIndex::build(&records);
        Self {
            records,
            dates,
            regions,
            index,
        }
    }
}

/// Record repository holding the dataset and the selected date window.
#[derive(Debug, Default)]
pub struct RecordRepository {
    dataset: Option<Dataset>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    window: Option<Vec<usize>>,
}

impl RecordRepository {
    /// Creates an unloaded repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository already loaded with `records`.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            dataset: Some(Dataset::new(records)),
            ..Self::default()
        }
    }

    /// Loads every record from `source`, preserving source order.
    ///
    /// Returns the number of loaded records.
    ///
    /// # Errors
    /// - `RepoError::AlreadyLoaded` when records were loaded before.
    /// - `RepoError::Load` when the source is unreadable or malformed; the
    ///   repository stays unloaded.
    ///
    /// # Side effects
    /// - Emits `records_load` logging events with duration and status.
    pub fn load<S: RecordSource + ?Sized>(&mut self, source: &S) -> RepoResult<usize> {
        if self.dataset.is_some() {
            return Err(RepoError::AlreadyLoaded);
        }

        let started_at = Instant::now();
        info!(
            "event=records_load module=repo status=start source={}",
            source.describe()
        );
        let records = match source.read_records() {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=records_load module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let count = records.len();
        self.dataset = Some(Dataset::new(records));
        info!(
            "event=records_load module=repo status=ok rows={} duration_ms={}",
            count,
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    fn dataset(&self) -> RepoResult<&Dataset> {
        self.dataset.as_ref().ok_or(RepoError::NotLoaded)
    }

    /// Canonical record set in load order.
    pub fn records(&self) -> RepoResult<&[Record]> {
        Ok(&self.dataset()?.records)
    }

    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.dataset()?.records.len())
    }

    /// Returns whether at least one record carries exactly `date`.
    pub fn is_valid_date(&self, date: NaiveDate) -> RepoResult<bool> {
        Ok(self.dataset()?.dates.contains(&date))
    }

    /// Earliest and latest record dates; `None` for an empty dataset.
    pub fn date_coverage(&self) -> RepoResult<Option<(NaiveDate, NaiveDate)>> {
        let dates = &self.dataset()?.dates;
        Ok(dates.iter().min().copied().zip(dates.iter().max().copied()))
    }

    /// Distinct region names in first-seen order.
    pub fn regions(&self) -> RepoResult<&[String]> {
        Ok(&self.dataset()?.regions)
    }

    /// Records whose region equals `region` exactly, in canonical order.
    ///
    /// Scans the current window when `use_window` is set, else the full set.
    ///
    /// # Errors
    /// - `RepoError::WindowNotSet` for a window scan before any recompute.
    pub fn filter_by_region(&self, region: &str, use_window: bool) -> RepoResult<Vec<&Record>> {
        let positions = self.region_positions(region, use_window)?;
        self.records_at(&positions)
    }

    /// Positions of `region` records within the chosen scope.
    pub(crate) fn region_positions(&self, region: &str, use_window: bool) -> RepoResult<Vec<usize>> {
        let dataset = self.dataset()?;
        let positions: Vec<usize> = if use_window {
            let window = self.window.as_ref().ok_or(RepoError::WindowNotSet)?;
            window
                .iter()
                .copied()
                .filter(|&position| dataset.records[position].region == region)
                .collect()
        } else {
            dataset
                .records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.region == region)
                .map(|(position, _)| position)
                .collect()
        };
        debug!(
            "event=region_filter module=repo status=ok use_window={} rows={}",
            use_window,
            positions.len()
        );
        Ok(positions)
    }

    /// Resolves positions produced by this repository into records.
    pub(crate) fn records_at(&self, positions: &[usize]) -> RepoResult<Vec<&Record>> {
        let records = &self.dataset()?.records;
        Ok(positions
            .iter()
            .filter_map(|&position| records.get(position))
            .collect())
    }

    /// Stores the lower window bound. Not validated; see `is_valid_date`.
    pub fn set_from_date(&mut self, date: NaiveDate) {
        self.from_date = Some(date);
    }

    /// Stores the upper window bound. Not validated; see `is_valid_date`.
    pub fn set_to_date(&mut self, date: NaiveDate) {
        self.to_date = Some(date);
    }

    pub fn from_date(&self) -> Option<NaiveDate> {
        self.from_date
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        self.to_date
    }

    /// Clears both bounds and forgets the computed window.
    pub fn clear_range(&mut self) {
        self.from_date = None;
        self.to_date = None;
        self.window = None;
    }

    /// Rebuilds the window from the current bounds, inclusive on both ends.
    ///
    /// A `from` date after the `to` date yields an empty window. Returns the
    /// number of records in the new window.
    ///
    /// # Errors
    /// - `RepoError::NotLoaded` before load.
    /// - `RepoError::IncompleteRange` when a bound is missing.
    pub fn recompute_window(&mut self) -> RepoResult<usize> {
        let dataset = self.dataset.as_ref().ok_or(RepoError::NotLoaded)?;
        let (from, to) = match (self.from_date, self.to_date) {
            (Some(from), Some(to)) => (from, to),
            (None, Some(_)) => {
                return Err(RepoError::IncompleteRange {
                    missing: MissingBound::From,
                })
            }
            (Some(_), None) => {
                return Err(RepoError::IncompleteRange {
                    missing: MissingBound::To,
                })
            }
            (None, None) => {
                return Err(RepoError::IncompleteRange {
                    missing: MissingBound::Both,
                })
            }
        };

        let window: Vec<usize> = dataset
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| from <= record.date && record.date <= to)
            .map(|(position, _)| position)
            .collect();
        let count = window.len();
        self.window = Some(window);
        info!(
            "event=window_recompute module=repo status=ok from={} to={} rows={}",
            from, to, count
        );
        Ok(count)
    }

    /// Returns whether `recompute_window` has succeeded at least once.
    pub fn has_window(&self) -> bool {
        self.window.is_some()
    }

    /// Records inside the last computed window, in canonical order.
    ///
    /// # Errors
    /// - `RepoError::NotLoaded` before load.
    /// - `RepoError::WindowNotSet` before any recompute.
    pub fn window(&self) -> RepoResult<Vec<&Record>> {
        self.dataset()?;
        let positions = self.window.as_ref().ok_or(RepoError::WindowNotSet)?;
        self.records_at(positions)
    }

    /// Panel aggregates over the current window.
    pub fn window_summary(&self) -> RepoResult<WindowSummary> {
        Ok(summarize(&self.window()?))
    }

    /// Raw sum of `metric` for `region` across the current window.
    pub fn region_total(&self, region: &str, metric: ComparisonMetric) -> RepoResult<u64> {
        Ok(region_total(&self.window()?, region, metric))
    }

    /// Newest known `metric` for `region` over the full record set.
    ///
    /// # Errors
    /// - `RepoError::Stats(StatsError::NoKnownValue)` when the region has no
    ///   records or none carries a known value.
    pub fn latest_known_for_region(&self, region: &str, metric: Metric) -> RepoResult<i64> {
        let dataset = self.dataset()?;
        dataset
            .index
            .latest_known(&dataset.records, region, metric)
            .ok_or(RepoError::Stats(StatsError::NoKnownValue))
    }

    /// Newest known total deaths for `region` over the full record set.
    pub fn latest_known_total_deaths(&self, region: &str) -> RepoResult<u64> {
        let value = self.latest_known_for_region(region, Metric::TotalDeaths)?;
        u64::try_from(value).map_err(|_| RepoError::Stats(StatsError::NoKnownValue))
    }
}
