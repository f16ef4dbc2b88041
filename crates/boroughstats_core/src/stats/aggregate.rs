//! Window aggregates for the statistics panel.
//!
//! Unknown values are excluded from all four aggregates: sums skip them and
//! means divide by the number of known values.

use crate::model::record::{Metric, Record};
use serde::Serialize;

/// Aggregates over a non-empty window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStats {
    pub records: usize,
    pub sum_total_deaths: u64,
    pub mean_total_cases: Option<f64>,
    pub mean_parks_mobility: Option<f64>,
    pub mean_transit_mobility: Option<f64>,
}

/// Result of aggregating a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WindowSummary {
    /// Window holds no records.
    NoData,
    Stats(WindowStats),
}

impl WindowSummary {
    pub fn stats(&self) -> Option<&WindowStats> {
        match self {
            Self::NoData => None,
            Self::Stats(stats) => Some(stats),
        }
    }
}

/// Computes every panel aggregate, or `NoData` for an empty window.
pub fn summarize(records: &[&Record]) -> WindowSummary {
    if records.is_empty() {
        return WindowSummary::NoData;
    }
    WindowSummary::Stats(WindowStats {
        records: records.len(),
        sum_total_deaths: sum_total_deaths(records),
        mean_total_cases: mean_total_cases(records),
        mean_parks_mobility: mean_parks_mobility(records),
        mean_transit_mobility: mean_transit_mobility(records),
    })
}

/// Sum of known `total_deaths`.
pub fn sum_total_deaths(records: &[&Record]) -> u64 {
    records.iter().filter_map(|record| record.total_deaths).sum()
}

/// Mean of known `total_cases`.
pub fn mean_total_cases(records: &[&Record]) -> Option<f64> {
    mean_of(records, Metric::TotalCases)
}

/// Mean of known parks mobility change.
pub fn mean_parks_mobility(records: &[&Record]) -> Option<f64> {
    mean_of(records, Metric::Parks)
}

/// Mean of known transit mobility change.
pub fn mean_transit_mobility(records: &[&Record]) -> Option<f64> {
    mean_of(records, Metric::Transit)
}

/// Mean of the known values of `metric`; `None` when none are known.
pub fn mean_of(records: &[&Record], metric: Metric) -> Option<f64> {
    let (sum, count) = records
        .iter()
        .filter_map(|record| record.value(metric))
        .fold((0i64, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::{mean_of, summarize, sum_total_deaths, WindowSummary};
    use crate::model::record::{Metric, Mobility, Record};
    use chrono::NaiveDate;

    fn record(day: u32, total_cases: Option<u64>, total_deaths: Option<u64>, parks: Option<i64>) -> Record {
        let mobility = Mobility {
            parks,
            transit: parks.map(|value| value * 2),
            ..Mobility::default()
        };
        Record::new(NaiveDate::from_ymd_opt(2022, 1, day).unwrap(), "Hackney")
            .with_cases(None, total_cases)
            .with_deaths(None, total_deaths)
            .with_mobility(mobility)
    }

    #[test]
    fn empty_window_is_no_data() {
        assert_eq!(summarize(&[]), WindowSummary::NoData);
        assert_eq!(WindowSummary::NoData.stats(), None);
    }

    #[test]
    fn unknown_values_are_excluded_from_sum_and_mean() {
        let a = record(1, Some(10), Some(4), Some(-20));
        let b = record(2, None, None, None);
        let c = record(3, Some(30), Some(6), Some(10));
        let window = vec![&a, &b, &c];

        assert_eq!(sum_total_deaths(&window), 10);
        let stats = *summarize(&window).stats().unwrap();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.sum_total_deaths, 10);
        assert_eq!(stats.mean_total_cases, Some(20.0));
        assert_eq!(stats.mean_parks_mobility, Some(-5.0));
        assert_eq!(stats.mean_transit_mobility, Some(-10.0));
    }

    #[test]
    fn mean_without_known_values_is_none() {
        let a = record(1, None, None, None);
        assert_eq!(mean_of(&[&a], Metric::TotalCases), None);
        let stats = *summarize(&[&a]).stats().unwrap();
        assert_eq!(stats.sum_total_deaths, 0);
        assert_eq!(stats.mean_parks_mobility, None);
    }
}
