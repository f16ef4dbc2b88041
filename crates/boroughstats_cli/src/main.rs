//! `boroughstats` command-line front-end.
//!
//! # Responsibility
//! - Load one CSV export and answer the queries named on the command line.
//! - Keep all query semantics in `boroughstats_core`; this binary only renders.

mod cli;
mod report;

use anyhow::{Context, Result};
use boroughstats_core::{default_log_level, init_logging, CsvFileSource, DashboardService, RecordRepository};
use clap::Parser;
use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &dir.to_string_lossy())
            .with_context(|| format!("failed to start logging in {}", dir.display()))?;
    }

    let mut repo = RecordRepository::new();
    let rows = repo
        .load(&CsvFileSource::new(&args.data))
        .with_context(|| format!("failed to load {}", args.data.display()))?;
    log::info!(
        "event=cli_start module=cli status=ok rows={} format={:?}",
        rows,
        args.format
    );

    let mut service = DashboardService::new(repo);
    let report = report::build(&mut service, &args)?;
    println!("{}", report::render(&report, args.format)?);
    Ok(())
}
