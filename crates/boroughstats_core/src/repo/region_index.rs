//! Per-region positions sorted by date.
//!
//! # Invariants
//! - Positions refer into the canonical record set the index was built from.
//! - Within a region, positions are ordered by date; equal dates keep source
//!   order (stable sort).

use crate::model::record::{Metric, Record};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    by_region: HashMap<String, Vec<usize>>,
}

impl RegionIndex {
    pub fn build(records: &[Record]) -> Self {
        let mut by_region: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, record) in records.iter().enumerate() {
            by_region
                .entry(record.region.clone())
                .or_default()
                .push(position);
        }
        for positions in by_region.values_mut() {
            positions.sort_by_key(|&position| records[position].date);
        }
        Self { by_region }
    }

    /// Date-ordered positions for `region`; empty when unknown.
    pub fn positions(&self, region: &str) -> &[usize] {
        self.by_region
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Newest known `metric` for `region`, scanning backwards from the latest date.
    ///
    /// Ties on one date resolve to the record that came first in the source.
    pub fn latest_known(&self, records: &[Record], region: &str, metric: Metric) -> Option<i64> {
        let positions = self.positions(region);
        let mut end = positions.len();
        while end > 0 {
            let date = records[positions[end - 1]].date;
            let mut start = end - 1;
            while start > 0 && records[positions[start - 1]].date == date {
                start -= 1;
            }
            let known = positions[start..end]
                .iter()
                .find_map(|&position| records[position].value(metric));
            if known.is_some() {
                return known;
            }
            end = start;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::RegionIndex;
    use crate::model::record::{Metric, Record};
    use chrono::NaiveDate;

    fn record(day: u32, region: &str, total_deaths: Option<u64>) -> Record {
        Record::new(NaiveDate::from_ymd_opt(2022, 3, day).unwrap(), region)
            .with_deaths(None, total_deaths)
    }

    #[test]
    fn positions_are_date_sorted_per_region() {
        let records = vec![
            record(3, "A", Some(3)),
            record(1, "B", Some(1)),
            record(1, "A", Some(1)),
            record(2, "A", Some(2)),
        ];
        let index = RegionIndex::build(&records);
        assert_eq!(index.positions("A"), &[2, 3, 0]);
        assert_eq!(index.positions("B"), &[1]);
        assert!(index.positions("C").is_empty());
    }

    #[test]
    fn latest_known_skips_unknown_dates() {
        let records = vec![
            record(1, "A", Some(1)),
            record(4, "A", None),
            record(3, "A", None),
            record(2, "A", Some(2)),
        ];
        let index = RegionIndex::build(&records);
        assert_eq!(index.latest_known(&records, "A", Metric::TotalDeaths), Some(2));
        assert_eq!(index.latest_known(&records, "Z", Metric::TotalDeaths), None);
    }

    #[test]
    fn same_day_tie_resolves_to_source_order() {
        let records = vec![record(5, "A", None), record(5, "A", Some(8)), record(5, "A", Some(9))];
        let index = RegionIndex::build(&records);
        assert_eq!(index.latest_known(&records, "A", Metric::TotalDeaths), Some(8));
    }
}
