//! The pipeline driver: fetch → convert → filter → export, strictly in order.
//!
//! Fetch, convert and filter are prerequisites; the first failure among them
//! ends the run. Export tolerates per-layer failure and reports it.

use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PrepConfig;
use crate::convert;
use crate::export::{self, ExportReport};
use crate::fetch::{self, FetchError};
use crate::filter::{self, FilterJob};
use crate::paths::RunDirs;
use crate::tool::{ToolError, ToolRunner};

/// Stage that ended the run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("snapshot download failed")]
    Fetch(#[source] FetchError),
    #[error("o5m conversion failed")]
    Convert(#[source] ToolError),
    #[error("roadway filter failed")]
    Filter(#[source] ToolError),
    #[error("shapefile export failed")]
    Export(#[source] ToolError),
}

/// Every artifact one successful run produced.
#[derive(Debug)]
pub struct PipelineSummary {
    pub dirs: RunDirs,
    pub snapshot: PathBuf,
    pub o5m: PathBuf,
    pub filtered: PathBuf,
    pub export: ExportReport,
}

pub struct Pipeline<'a> {
    config: &'a PrepConfig,
    runner: &'a dyn ToolRunner,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a PrepConfig, runner: &'a dyn ToolRunner) -> Self {
        Self { config, runner }
    }

    /// Runs all four stages for the run directories stamped with `date`.
    pub fn run(&self, date: NaiveDate) -> Result<PipelineSummary, PipelineError> {
        let cfg = self.config;
        let started = Instant::now();
        let dirs = RunDirs::resolve(cfg, date);
        tracing::debug!(?dirs, "resolved run directories");

        let snapshot = fetch::fetch_snapshot(&cfg.url, &dirs.download, cfg.verify_tls)
            .map_err(PipelineError::Fetch)?;

        let o5m = convert::convert_to_o5m(self.runner, &cfg.tools.osmconvert, &snapshot, &dirs.extract)
            .map_err(PipelineError::Convert)?;

        let filtered = filter::filter_roadways(
            self.runner,
            &FilterJob {
                osmfilter: &cfg.tools.osmfilter,
                source: &snapshot,
                o5m: &o5m,
                workdir: &dirs.extract,
                scratch: &cfg.scratch_file,
                rules: &cfg.filter,
            },
        )
        .map_err(PipelineError::Filter)?;

        let export = export::export_shapefiles(
            self.runner,
            &cfg.tools.ogr2ogr,
            &filtered,
            &dirs.output,
            &cfg.output_name,
        )
        .map_err(PipelineError::Export)?;

        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            layers_ok = export.succeeded().count(),
            "pipeline finished, shapefiles in {}",
            dirs.output.display()
        );

        Ok(PipelineSummary {
            dirs,
            snapshot,
            o5m,
            filtered,
            export,
        })
    }
}
