//! Roadway extraction with osmfilter.
//!
//! Keeps everything tagged `highway=*` and drops the minor and non-vehicular
//! classes listed in [`FilterRules`]. The rules are configuration data; the
//! defaults reproduce the list the dataset has always been built with.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;
use crate::storage;
use crate::tool::{ToolCommand, ToolError, ToolRunner};

/// Tag expressions passed to osmfilter's `--keep=` and `--drop=`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    pub keep: String,
    /// Joined with single spaces into one `--drop=` argument.
    pub drop: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        let drop = [
            "highway=footway",
            "highway=pedestrian",
            "highway=path",
            "highway=track",
            "highway=steps",
            "highway=cycleway",
            "highway=bridleway",
            "access=private",
            "highway=raceway",
            "highway=abandoned",
            "construction=footway",
            "access=private",
        ];
        Self {
            keep: "highway=".to_string(),
            drop: drop.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FilterRules {
    pub fn keep_arg(&self) -> String {
        format!("--keep={}", self.keep)
    }

    pub fn drop_arg(&self) -> String {
        format!("--drop={}", self.drop.join(" "))
    }
}

/// Builds `<osmfilter> <input> --keep=.. --drop=.. -o=<output> -t=<scratch> --verbose`.
pub fn filter_command(
    osmfilter: &Path,
    input: &Path,
    output: &Path,
    scratch: &Path,
    rules: &FilterRules,
) -> ToolCommand {
    ToolCommand::new(osmfilter)
        .arg(input)
        .arg(rules.keep_arg())
        .arg(rules.drop_arg())
        .flag_path("-o=", output)
        .flag_path("-t=", scratch)
        .arg("--verbose")
}

/// Inputs of the filter stage.
#[derive(Debug, Clone, Copy)]
pub struct FilterJob<'a> {
    pub osmfilter: &'a Path,
    /// The downloaded snapshot; only its name is used, for the output name.
    pub source: &'a Path,
    /// The converter's `.o5m` output, read by osmfilter.
    pub o5m: &'a Path,
    pub workdir: &'a Path,
    /// Fixed scratch file; concurrent runs on one machine would collide here.
    pub scratch: &'a Path,
    pub rules: &'a FilterRules,
}

/// Filters `job.o5m` into `<workdir>/<stem>_roadways.osm` and returns that path.
/// A non-zero exit from osmfilter is returned as an error.
pub fn filter_roadways(runner: &dyn ToolRunner, job: &FilterJob<'_>) -> Result<PathBuf, ToolError> {
    storage::ensure_dir(job.workdir).map_err(ToolError::io(job.workdir))?;
    if let Some(parent) = job.scratch.parent() {
        storage::ensure_dir(parent).map_err(ToolError::io(parent))?;
    }

    let filtered = paths::filtered_path(job.workdir, job.source);
    tracing::info!("filtering roadways into {}", filtered.display());
    storage::remove_stale(&filtered).map_err(ToolError::io(&filtered))?;

    runner.run(&filter_command(
        job.osmfilter,
        job.o5m,
        &filtered,
        job.scratch,
        job.rules,
    ))?;
    Ok(filtered)
}
