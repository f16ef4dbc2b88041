//! Per-region totals for the comparison bar chart.
//!
//! The engine returns raw sums; chart scaling is applied separately through
//! [`ComparisonMetric::scale_for_display`].

use crate::model::record::{Metric, Record};
use serde::Serialize;
use std::str::FromStr;

/// Metrics offered by the comparison chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    NewCases,
    NewDeaths,
}

impl ComparisonMetric {
    /// Chart series label.
    pub fn label(self) -> &'static str {
        match self {
            Self::NewCases => "New Cases",
            Self::NewDeaths => "New Deaths",
        }
    }

    /// Record field summed by this metric.
    pub fn metric(self) -> Metric {
        match self {
            Self::NewCases => Metric::NewCases,
            Self::NewDeaths => Metric::NewDeaths,
        }
    }

    /// Multiplier that keeps deaths visible next to cases on one axis.
    pub fn display_scale(self) -> u64 {
        match self {
            Self::NewCases => 1,
            Self::NewDeaths => 100,
        }
    }

    pub fn scale_for_display(self, raw_total: u64) -> u64 {
        raw_total.saturating_mul(self.display_scale())
    }
}

impl FromStr for ComparisonMetric {
    type Err = String;

    /// Accepts chart labels (`New Cases`) and short CLI names (`cases`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "new cases" | "new_cases" | "cases" => Ok(Self::NewCases),
            "new deaths" | "new_deaths" | "deaths" => Ok(Self::NewDeaths),
            other => Err(format!(
                "unsupported comparison metric `{other}`; expected cases|deaths"
            )),
        }
    }
}

/// Raw sum of `metric` over the records of `region`, skipping unknowns.
pub fn region_total(records: &[&Record], region: &str, metric: ComparisonMetric) -> u64 {
    let field = metric.metric();
    records
        .iter()
        .filter(|record| record.region == region)
        .filter_map(|record| record.value(field))
        .map(|value| value.unsigned_abs())
        .sum()
}
