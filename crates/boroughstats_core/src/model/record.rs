//! Record domain model.
//!
//! # Responsibility
//! - Define the canonical observation shared by every query and aggregate.
//! - Keep "not reported" distinct from any real measurement.
//!
//! # Invariants
//! - Unknown values are `None`; they are never read as zero.
//! - Count fields are non-negative when known.
//! - Records are immutable after load and never copied into derived subsets.

use chrono::NaiveDate;
use serde::Serialize;

/// Out-of-domain marker used by legacy exports for "not reported".
///
/// Only the loader recognizes it; inside the engine unknown is `None`.
pub const UNKNOWN_SENTINEL: i64 = -1;

/// Numeric fields carried by a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    NewCases,
    TotalCases,
    NewDeaths,
    TotalDeaths,
    RetailRecreation,
    GroceryPharmacy,
    Parks,
    Transit,
    Workplaces,
    Residential,
}

impl Metric {
    /// Every metric, counts first, then mobility in source column order.
    pub const ALL: [Metric; 10] = [
        Metric::NewCases,
        Metric::TotalCases,
        Metric::NewDeaths,
        Metric::TotalDeaths,
        Metric::RetailRecreation,
        Metric::GroceryPharmacy,
        Metric::Parks,
        Metric::Transit,
        Metric::Workplaces,
        Metric::Residential,
    ];

    /// The six mobility-change metrics.
    pub const MOBILITY: [Metric; 6] = [
        Metric::RetailRecreation,
        Metric::GroceryPharmacy,
        Metric::Parks,
        Metric::Transit,
        Metric::Workplaces,
        Metric::Residential,
    ];

    /// Returns whether this metric is a non-negative count.
    pub fn is_count(self) -> bool {
        matches!(
            self,
            Metric::NewCases | Metric::TotalCases | Metric::NewDeaths | Metric::TotalDeaths
        )
    }

    /// Stable snake_case name, used in logs and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::NewCases => "new_cases",
            Metric::TotalCases => "total_cases",
            Metric::NewDeaths => "new_deaths",
            Metric::TotalDeaths => "total_deaths",
            Metric::RetailRecreation => "retail_recreation",
            Metric::GroceryPharmacy => "grocery_pharmacy",
            Metric::Parks => "parks",
            Metric::Transit => "transit",
            Metric::Workplaces => "workplaces",
            Metric::Residential => "residential",
        }
    }
}

/// Percentage change from baseline for the six mobility categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Mobility {
    pub retail_recreation: Option<i64>,
    pub grocery_pharmacy: Option<i64>,
    pub parks: Option<i64>,
    pub transit: Option<i64>,
    pub workplaces: Option<i64>,
    pub residential: Option<i64>,
}

impl Mobility {
    /// Builds a mobility block where every category has the same value.
    pub fn uniform(value: Option<i64>) -> Self {
        Self {
            retail_recreation: value,
            grocery_pharmacy: value,
            parks: value,
            transit: value,
            workplaces: value,
            residential: value,
        }
    }

    fn values(&self) -> [Option<i64>; 6] {
        [
            self.retail_recreation,
            self.grocery_pharmacy,
            self.parks,
            self.transit,
            self.workplaces,
            self.residential,
        ]
    }
}

/// One observation for a region on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub region: String,
    pub new_cases: Option<u64>,
    pub total_cases: Option<u64>,
    pub new_deaths: Option<u64>,
    pub total_deaths: Option<u64>,
    pub mobility: Mobility,
}

impl Record {
    /// Creates a record with every numeric field unknown.
    pub fn new(date: NaiveDate, region: impl Into<String>) -> Self {
        Self {
            date,
            region: region.into(),
            new_cases: None,
            total_cases: None,
            new_deaths: None,
            total_deaths: None,
            mobility: Mobility::default(),
        }
    }

    /// Sets case counts.
    pub fn with_cases(mut self, new_cases: Option<u64>, total_cases: Option<u64>) -> Self {
        self.new_cases = new_cases;
        self.total_cases = total_cases;
        self
    }

    /// Sets death counts.
    pub fn with_deaths(mut self, new_deaths: Option<u64>, total_deaths: Option<u64>) -> Self {
        self.new_deaths = new_deaths;
        self.total_deaths = total_deaths;
        self
    }

    /// Replaces the mobility block.
    pub fn with_mobility(mut self, mobility: Mobility) -> Self {
        self.mobility = mobility;
        self
    }

    /// Returns one field widened to `i64`, `None` when not reported.
    pub fn value(&self, metric: Metric) -> Option<i64> {
        let count = |value: Option<u64>| value.and_then(|v| i64::try_from(v).ok());
        match metric {
            Metric::NewCases => count(self.new_cases),
            Metric::TotalCases => count(self.total_cases),
            Metric::NewDeaths => count(self.new_deaths),
            Metric::TotalDeaths => count(self.total_deaths),
            Metric::RetailRecreation => self.mobility.retail_recreation,
            Metric::GroceryPharmacy => self.mobility.grocery_pharmacy,
            Metric::Parks => self.mobility.parks,
            Metric::Transit => self.mobility.transit,
            Metric::Workplaces => self.mobility.workplaces,
            Metric::Residential => self.mobility.residential,
        }
    }

    /// Mean of the known mobility categories.
    ///
    /// Returns `None` when no category was reported.
    pub fn average_mobility(&self) -> Option<f64> {
        let known: Vec<i64> = self.mobility.values().into_iter().flatten().collect();
        if known.is_empty() {
            return None;
        }
        Some(known.iter().sum::<i64>() as f64 / known.len() as f64)
    }
}
