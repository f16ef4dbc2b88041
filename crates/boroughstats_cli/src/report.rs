//! Builds one report from the parsed arguments and renders it.

use crate::cli::{Args, OutputFormat};
use anyhow::{bail, Context, Result};
use boroughstats_core::{
    borough_name, ComparisonSeries, DashboardService, RangeStatus, Record, RegionDeathBand,
    WindowSummary,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Serialize)]
pub struct Report {
    pub rows: usize,
    pub regions: usize,
    pub coverage: Option<(NaiveDate, NaiveDate)>,
    pub range: RangeStatus,
    pub range_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<WindowSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Vec<ComparisonSeries>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<Vec<RegionDeathBand>>,
}

#[derive(Debug, Serialize)]
pub struct Selection {
    pub region: String,
    pub window_only: bool,
    pub records: Vec<Record>,
}

/// Runs every query requested by `args` against `service`.
pub fn build(service: &mut DashboardService, args: &Args) -> Result<Report> {
    if let Some(from) = args.from {
        service.set_from_date(from);
    }
    if let Some(to) = args.to {
        service.set_to_date(to);
    }

    let range = service.range_status()?;
    let range_label = service.range_label()?;
    let stats = match range {
        RangeStatus::Valid { .. } => {
            service.apply_range()?;
            Some(service.stats_panel()?)
        }
        RangeStatus::NotSelected => None,
        _ => {
            log::warn!("event=cli_range module=cli status=rejected reason={range}");
            None
        }
    };

    let selection = match args.region.as_deref() {
        Some(requested) => {
            let region = borough_name(requested).unwrap_or(requested).to_string();
            service
                .select_region(&region, args.window_only)
                .with_context(|| format!("cannot list region `{region}`"))?;
            let records = match args.sort {
                Some(key) => service.sorted_selection(key)?,
                None => service.selection()?,
            };
            Some(Selection {
                records: records.into_iter().cloned().collect(),
                region,
                window_only: args.window_only,
            })
        }
        None => None,
    };

    let comparison = match args.compare.as_slice() {
        [] => None,
        [first, second] => {
            let first = borough_name(first).unwrap_or(first.as_str());
            let second = borough_name(second).unwrap_or(second.as_str());
            Some(
                service
                    .compare_regions(first, second, &args.metric)
                    .context("comparison needs a valid --from/--to range")?,
            )
        }
        other => bail!("--compare takes exactly two regions, got {}", other.len()),
    };

    let map = if args.map {
        Some(service.map_overview()?)
    } else {
        None
    };

    let repo = service.repo();
    Ok(Report {
        rows: repo.len()?,
        regions: repo.regions()?.len(),
        coverage: repo.date_coverage()?,
        range,
        range_label,
        stats,
        selection,
        comparison,
        map,
    })
}

pub fn render(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(render_text(report)?),
    }
}

fn render_text(report: &Report) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "records: {} across {} regions", report.rows, report.regions)?;
    if let Some((first, last)) = report.coverage {
        writeln!(out, "coverage: {first} - {last}")?;
    }
    writeln!(out, "{}", report.range_label)?;

    match &report.stats {
        Some(WindowSummary::Stats(stats)) => {
            writeln!(out, "window records: {}", stats.records)?;
            writeln!(out, "total deaths (sum): {}", stats.sum_total_deaths)?;
            writeln!(out, "total cases (mean): {}", decimal(stats.mean_total_cases))?;
            writeln!(out, "parks mobility % change (mean): {}", decimal(stats.mean_parks_mobility))?;
            writeln!(out, "transit mobility % change (mean): {}", decimal(stats.mean_transit_mobility))?;
        }
        Some(WindowSummary::NoData) => writeln!(out, "No data")?,
        None => {}
    }

    if let Some(selection) = &report.selection {
        writeln!(out)?;
        writeln!(out, "{} ({} rows)", selection.region, selection.records.len())?;
        writeln!(out, "date        new_cases  total_cases  new_deaths  total_deaths  mobility")?;
        for record in &selection.records {
            writeln!(
                out,
                "{}  {:>9}  {:>11}  {:>10}  {:>12}  {:>8}",
                record.date,
                count(record.new_cases),
                count(record.total_cases),
                count(record.new_deaths),
                count(record.total_deaths),
                decimal(record.average_mobility()),
            )?;
        }
    }

    if let Some(series) = &report.comparison {
        writeln!(out)?;
        for entry in series {
            let bars: Vec<String> = entry
                .points
                .iter()
                .map(|point| format!("{}={}", point.region, point.display_value))
                .collect();
            writeln!(out, "{}: {}", entry.label, bars.join(", "))?;
        }
    }

    if let Some(map) = &report.map {
        writeln!(out)?;
        for tile in map {
            writeln!(
                out,
                "{} {:<24} {:>6} {:?}",
                tile.code,
                tile.region,
                count(tile.latest_total_deaths),
                tile.band
            )?;
        }
    }
    Ok(out)
}

fn count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn decimal(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::{build, render, OutputFormat};
    use crate::cli::Args;
    use boroughstats_core::{DashboardService, Record, RecordRepository};
    use chrono::NaiveDate;
    use clap::Parser;

    fn service() -> DashboardService {
        let day = |d| NaiveDate::from_ymd_opt(2022, 1, d).unwrap();
        DashboardService::new(RecordRepository::from_records(vec![
            Record::new(day(1), "Camden").with_deaths(Some(1), Some(600)),
            Record::new(day(2), "Brent").with_deaths(Some(2), Some(400)),
        ]))
    }

    #[test]
    fn text_report_lists_window_and_selection() {
        let args = Args::try_parse_from([
            "boroughstats", "--data", "x.csv", "--from", "2022-01-01", "--to", "2022-01-02",
            "--region", "CAMD",
        ])
        .unwrap();
        let mut service = service();
        let report = build(&mut service, &args).unwrap();
        let text = render(&report, OutputFormat::Text).unwrap();

        assert!(text.contains("2022-01-01 - 2022-01-02"), "{text}");
        assert!(text.contains("total deaths (sum): 1000"), "{text}");
        assert!(text.contains("Camden (1 rows)"), "{text}");
    }

    #[test]
    fn json_report_includes_comparison() {
        let args = Args::try_parse_from([
            "boroughstats", "--data", "x.csv", "--from", "2022-01-01", "--to", "2022-01-02",
            "--compare", "Camden", "--compare", "Brent", "--metric", "deaths",
        ])
        .unwrap();
        let mut service = service();
        let report = build(&mut service, &args).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(json["range"]["status"], "valid");
        assert_eq!(json["comparison"][0]["points"][1]["display_value"], 200);
        assert!(json.get("map").is_none());
    }

    #[test]
    fn compare_requires_two_regions() {
        let args = Args::try_parse_from([
            "boroughstats", "--data", "x.csv", "--compare", "Camden",
        ])
        .unwrap();
        let mut service = service();
        assert!(build(&mut service, &args).is_err());
    }
}
