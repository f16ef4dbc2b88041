//! Header-driven CSV parsing for daily borough exports.
//!
//! # Responsibility
//! - Map known column names (short or long Google mobility names) to fields.
//! - Convert empty cells and the legacy `-1` count marker to unknown.
//!
//! # Invariants
//! - `date` and `borough`/`region` columns are required; others are optional.
//! - Every data row must have exactly as many cells as the header.
//! - Quoted cells may span lines; `Malformed` reports the line a row starts on.

use super::{LoadError, LoadResult, RecordSource};
use crate::model::record::{Metric, Record, UNKNOWN_SENTINEL};
use ::csv::StringRecord;
use chrono::NaiveDate;
use log::{error, info};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Calendar date format used in the date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for CsvFileSource {
    fn describe(&self) -> String {
        format!("csv path={}", self.path.display())
    }

    /// # Side effects
    /// - Emits `csv_read` logging events with duration and status.
    fn read_records(&self) -> LoadResult<Vec<Record>> {
        let started_at = Instant::now();
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) => {
                error!(
                    "event=csv_read module=loader status=error duration_ms={} error_code=open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        let records = parse_csv(BufReader::new(file))?;
        info!(
            "event=csv_read module=loader status=ok rows={} duration_ms={}",
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Region,
    Value(Metric),
}

#[derive(Debug)]
struct Layout {
    columns: Vec<Option<Column>>,
}

impl Layout {
    fn from_header(header: &StringRecord) -> LoadResult<Self> {
        if header.iter().all(|cell| cell.trim().is_empty()) {
            return Err(LoadError::MissingHeader);
        }

        let mut seen: Vec<Column> = Vec::new();
        let mut columns = Vec::new();
        for cell in header {
            // First occurrence wins when two headers map to the same field.
            let column = column_for(cell).filter(|column| !seen.contains(column));
            if let Some(column) = column {
                seen.push(column);
            }
            columns.push(column);
        }

        if !seen.contains(&Column::Date) {
            return Err(LoadError::MissingColumn("date"));
        }
        if !seen.contains(&Column::Region) {
            return Err(LoadError::MissingColumn("borough"));
        }
        Ok(Self { columns })
    }
}

fn column_for(header: &str) -> Option<Column> {
    let name = header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_ascii_lowercase();
    let column = match name.as_str() {
        "date" => Column::Date,
        "borough" | "region" | "area_name" => Column::Region,
        "new_cases" => Column::Value(Metric::NewCases),
        "total_cases" => Column::Value(Metric::TotalCases),
        "new_deaths" => Column::Value(Metric::NewDeaths),
        "total_deaths" => Column::Value(Metric::TotalDeaths),
        "retail_recreation_gmr" | "retail_and_recreation_percent_change_from_baseline" => {
            Column::Value(Metric::RetailRecreation)
        }
        "grocery_pharmacy_gmr" | "grocery_and_pharmacy_percent_change_from_baseline" => {
            Column::Value(Metric::GroceryPharmacy)
        }
        "parks_gmr" | "parks_percent_change_from_baseline" => Column::Value(Metric::Parks),
        "transit_gmr" | "transit_stations_gmr" | "transit_stations_percent_change_from_baseline" => {
            Column::Value(Metric::Transit)
        }
        "workplaces_gmr" | "workplaces_percent_change_from_baseline" => {
            Column::Value(Metric::Workplaces)
        }
        "residential_gmr" | "residential_percent_change_from_baseline" => {
            Column::Value(Metric::Residential)
        }
        _ => return None,
    };
    Some(column)
}

/// Parses CSV text into records, preserving row order.
///
/// # Errors
/// - `LoadError::Io` when the reader fails.
/// - `LoadError::MissingHeader` / `MissingColumn` for an unusable header.
/// - `LoadError::Malformed` for a row that cannot be parsed.
pub fn parse_csv<R: Read>(reader: R) -> LoadResult<Vec<Record>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);
    let layout = Layout::from_header(reader.headers().map_err(load_error)?)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(load_error)?;
        let line = row.position().map_or(0, |position| position.line() as usize);
        let record =
            parse_row(&layout, &row).map_err(|message| LoadError::Malformed { line, message })?;
        records.push(record);
    }
    Ok(records)
}

fn load_error(err: ::csv::Error) -> LoadError {
    let line = err.position().map_or(0, |position| position.line() as usize);
    let message = err.to_string();
    match err.into_kind() {
        ::csv::ErrorKind::Io(err) => LoadError::Io(err),
        ::csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => LoadError::Malformed {
            line,
            message: format!("expected {expected_len} cells, found {len}"),
        },
        _ => LoadError::Malformed { line, message },
    }
}

fn parse_row(layout: &Layout, row: &StringRecord) -> Result<Record, String> {
    let mut date = None;
    let mut region = None;
    let mut values: Vec<(Metric, Option<i64>)> = Vec::new();
    for (column, cell) in layout.columns.iter().zip(row.iter()) {
        let cell = cell.trim();
        match column {
            Some(Column::Date) => {
                let parsed = NaiveDate::parse_from_str(cell, DATE_FORMAT)
                    .map_err(|err| format!("invalid date `{cell}`: {err}"))?;
                date = Some(parsed);
            }
            Some(Column::Region) => {
                if cell.is_empty() {
                    return Err("region must not be empty".to_string());
                }
                region = Some(cell.to_string());
            }
            Some(Column::Value(metric)) => values.push((*metric, parse_value(*metric, cell)?)),
            None => {}
        }
    }

    let (Some(date), Some(region)) = (date, region) else {
        return Err("row is missing date or region".to_string());
    };
    let mut record = Record::new(date, region);
    for (metric, value) in values {
        apply_value(&mut record, metric, value);
    }
    Ok(record)
}

fn parse_value(metric: Metric, cell: &str) -> Result<Option<i64>, String> {
    if cell.is_empty() {
        return Ok(None);
    }
    let value: i64 = cell
        .parse()
        .map_err(|_| format!("invalid integer `{cell}` in {}", metric.as_str()))?;
    if metric.is_count() {
        if value == UNKNOWN_SENTINEL {
            return Ok(None);
        }
        if value < 0 {
            return Err(format!("negative count {value} in {}", metric.as_str()));
        }
    }
    Ok(Some(value))
}

fn apply_value(record: &mut Record, metric: Metric, value: Option<i64>) {
    // Counts were range-checked in `parse_value`.
    let count = value.and_then(|v| u64::try_from(v).ok());
    match metric {
        Metric::NewCases => record.new_cases = count,
        Metric::TotalCases => record.total_cases = count,
        Metric::NewDeaths => record.new_deaths = count,
        Metric::TotalDeaths => record.total_deaths = count,
        Metric::RetailRecreation => record.mobility.retail_recreation = value,
        Metric::GroceryPharmacy => record.mobility.grocery_pharmacy = value,
        Metric::Parks => record.mobility.parks = value,
        Metric::Transit => record.mobility.transit = value,
        Metric::Workplaces => record.mobility.workplaces = value,
        Metric::Residential => record.mobility.residential = value,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_csv;
    use crate::loader::LoadError;

    #[test]
    fn quoted_cells_keep_commas_escapes_and_newlines() {
        let input = "date,borough,new_cases\r\n\
                     2022-01-01,\"Kingston, Upon \"\"Thames\"\"\",3\r\n\
                     2022-01-02,\"Kingston\nUpon Thames\",1\n";
        let records = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].region, "Kingston, Upon \"Thames\"");
        assert_eq!(records[0].new_cases, Some(3));
        assert_eq!(records[1].region, "Kingston\nUpon Thames");
        assert_eq!(records[1].new_cases, Some(1));
    }

    #[test]
    fn malformed_row_reports_its_starting_line_after_multiline_cell() {
        let input = "date,borough,new_cases\n\
                     2022-01-01,\"Kingston\nUpon Thames\",1\n\
                     2022-01-02,Camden,oops\n";
        let err = parse_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 4, .. }), "{err}");
    }

    #[test]
    fn long_mobility_headers_are_recognized() {
        let input = "date,region,parks_percent_change_from_baseline,extra\n2022-01-01,Camden,-14,x\n";
        let records = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mobility.parks, Some(-14));
    }

    #[test]
    fn blank_lines_are_skipped_but_count_toward_line_numbers() {
        let input = "date,borough,new_cases\n\n2022-01-01,Camden,1\n\n2022-01-02,Camden,oops\n";
        let err = parse_csv(input.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 5, .. }), "{err}");
    }

    #[test]
    fn mobility_minus_one_is_a_real_value() {
        let input = "date,borough,total_deaths,parks_GMR\n2022-01-01,Camden,-1,-1\n";
        let records = parse_csv(input.as_bytes()).unwrap();
        assert_eq!(records[0].total_deaths, None);
        assert_eq!(records[0].mobility.parks, Some(-1));
    }
}
