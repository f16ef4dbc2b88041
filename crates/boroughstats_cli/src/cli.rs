//! Command-line arguments.

use boroughstats_core::{ComparisonMetric, SortKey};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Query daily borough health records from a CSV export.
///
/// Examples:
///   boroughstats --data london.csv --from 2022-01-02 --to 2022-01-09
///   boroughstats --data london.csv --from 2022-01-02 --to 2022-01-09 --region CAMD --window-only --sort new_cases
///   boroughstats --data london.csv --from 2022-01-02 --to 2022-01-09 --compare Camden --compare Brent
///   boroughstats --data london.csv --map --format json
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file with one row per date per borough
    #[arg(short, long, value_name = "FILE", env = "BOROUGHSTATS_DATA")]
    pub data: PathBuf,

    /// First day of the window (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub from: Option<NaiveDate>,

    /// Last day of the window (YYYY-MM-DD, inclusive)
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub to: Option<NaiveDate>,

    /// Region name or four-letter borough code to list
    #[arg(short, long, value_name = "REGION")]
    pub region: Option<String>,

    /// Restrict the region listing to the selected window
    #[arg(long, requires = "region")]
    pub window_only: bool,

    /// Sort the region listing (date, new_cases, total_cases, new_deaths, mobility)
    #[arg(long, value_name = "KEY", requires = "region")]
    pub sort: Option<SortKey>,

    /// Two regions to compare over the window (repeat the flag)
    #[arg(long, value_name = "REGION", num_args = 1)]
    pub compare: Vec<String>,

    /// Comparison metrics (comma-separated: cases, deaths)
    #[arg(long, value_name = "METRICS", value_delimiter = ',', default_value = "cases,deaths")]
    pub metric: Vec<ComparisonMetric>,

    /// Print newest known total deaths and band for every borough
    #[arg(long)]
    pub map: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", env = "BOROUGHSTATS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; file logging is off when unset
    #[arg(long, value_name = "DIR", env = "BOROUGHSTATS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), boroughstats_core::loader::DATE_FORMAT)
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{Args, OutputFormat};
    use boroughstats_core::{ComparisonMetric, SortKey};
    use clap::Parser;

    #[test]
    fn parses_full_query() {
        let args = Args::try_parse_from([
            "boroughstats",
            "--data",
            "london.csv",
            "--from",
            "2022-01-02",
            "--to",
            "2022-01-03",
            "--region",
            "Camden",
            "--window-only",
            "--sort",
            "new_cases",
            "--compare",
            "Camden",
            "--compare",
            "Brent",
            "--metric",
            "deaths",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.from.unwrap().to_string(), "2022-01-02");
        assert!(args.window_only);
        assert_eq!(args.sort, Some(SortKey::NewCases));
        assert_eq!(args.compare, vec!["Camden", "Brent"]);
        assert_eq!(args.metric, vec![ComparisonMetric::NewDeaths]);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn defaults_compare_both_metrics() {
        let args = Args::try_parse_from(["boroughstats", "--data", "x.csv"]).unwrap();
        assert_eq!(
            args.metric,
            vec![ComparisonMetric::NewCases, ComparisonMetric::NewDeaths]
        );
        assert_eq!(args.format, OutputFormat::Text);
    }

    #[test]
    fn rejects_bad_dates() {
        assert!(Args::try_parse_from(["boroughstats", "--data", "x.csv", "--from", "02/01/2022"]).is_err());
    }
}
