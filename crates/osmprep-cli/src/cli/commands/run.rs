//! `osmprep run` – fetch, convert, filter and export for one date stamp.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use osmprep_core::config::PrepConfig;
use osmprep_core::pipeline::Pipeline;
use osmprep_core::tool::{self, SystemRunner};

pub fn run_pipeline(cfg: &PrepConfig, date: NaiveDate, skip_preflight: bool) -> Result<()> {
    let start_time = Local::now();
    tracing::info!("start time: {}", start_time.format("%Y-%m-%d %H:%M:%S"));

    if !skip_preflight {
        tool::check_tools(&cfg.tools).context("preflight check of external tools")?;
    }

    let summary = Pipeline::new(cfg, &SystemRunner)
        .run(date)
        .context("pipeline aborted")?;

    for outcome in summary.export.failed() {
        tracing::warn!("layer {} was not exported", outcome.layer);
    }

    let end_time = Local::now();
    tracing::info!("execution completed: {}", end_time.format("%Y-%m-%d %H:%M:%S"));
    tracing::info!(
        "execution time: {:.1}s",
        (end_time - start_time).num_milliseconds() as f64 / 1000.0
    );
    println!(
        "Exported {} of {} layers to {}",
        summary.export.succeeded().count(),
        summary.export.outcomes.len(),
        summary.dirs.output.display()
    );
    Ok(())
}
