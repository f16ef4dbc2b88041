//! Newest-known-value lookup with gap skipping.
//!
//! # Invariants
//! - Input order and duplicate dates are irrelevant to the result.
//! - Each round excludes exactly one candidate, so the search terminates.
//! - "Nothing left to consider" is an explicit error, never a null deref.

use super::{StatsError, StatsResult};
use crate::model::record::{Metric, Record};

/// Returns `total_deaths` from the chronologically latest record that has it.
///
/// # Errors
/// - `StatsError::NoKnownValue` when `records` is empty or every record has
///   unknown `total_deaths`.
pub fn latest_known_total_deaths<'a, I>(records: I) -> StatsResult<u64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let value = latest_known(records, Metric::TotalDeaths)?;
    // Count metrics are non-negative by construction.
    u64::try_from(value).map_err(|_| StatsError::NoKnownValue)
}

/// Returns `metric` from the chronologically latest record where it is known.
///
/// Repeatedly picks the latest record not yet excluded; an unknown value
/// excludes that record and the search restarts over the remainder. Among
/// records sharing a date, the earliest in input order is picked first.
///
/// # Errors
/// - `StatsError::NoKnownValue` when no candidate carries a known value.
pub fn latest_known<'a, I>(records: I, metric: Metric) -> StatsResult<i64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let candidates: Vec<&Record> = records.into_iter().collect();
    let mut excluded = vec![false; candidates.len()];

    loop {
        let mut newest: Option<usize> = None;
        for (index, record) in candidates.iter().enumerate() {
            if excluded[index] {
                continue;
            }
            match newest {
                Some(current) if candidates[current].date >= record.date => {}
                _ => newest = Some(index),
            }
        }

        let Some(index) = newest else {
            return Err(StatsError::NoKnownValue);
        };
        match candidates[index].value(metric) {
            Some(value) => return Ok(value),
            None => excluded[index] = true,
        }
    }
}
