//! Artifact naming and the date-stamped run directories.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use crate::config::PrepConfig;

/// Extension of the converter's output.
pub const O5M_EXTENSION: &str = "o5m";

/// Suffix appended to the stem for the filter's output.
pub const FILTERED_SUFFIX: &str = "_roadways.osm";

/// Extension of every exported layer file.
pub const SHAPEFILE_EXTENSION: &str = "shp";

/// Base name of `path` up to its first `.`: `region.osm.pbf` → `region`.
pub fn dotless_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => name,
    }
}

/// `<workdir>/<stem>.o5m`
pub fn converted_path(workdir: &Path, source: &Path) -> PathBuf {
    workdir.join(format!("{}.{}", dotless_stem(source), O5M_EXTENSION))
}

/// `<workdir>/<stem>_roadways.osm`
pub fn filtered_path(workdir: &Path, source: &Path) -> PathBuf {
    workdir.join(format!("{}{}", dotless_stem(source), FILTERED_SUFFIX))
}

/// `<output_dir>/<output_name>_<layer>.shp`
pub fn layer_output_path(output_dir: &Path, output_name: &str, layer: &str) -> PathBuf {
    output_dir.join(format!("{}_{}.{}", output_name, layer, SHAPEFILE_EXTENSION))
}

/// Directory name for one run, e.g. `2024-03-09`.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The three per-run directories. Nothing is created here; each stage creates
/// its own directory when it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirs {
    pub download: PathBuf,
    pub extract: PathBuf,
    pub output: PathBuf,
}

impl RunDirs {
    /// Resolve the directories for `date`. The output root falls back to
    /// `fallback_output_root` when it is not an existing directory (e.g. an
    /// unmounted share).
    pub fn resolve(cfg: &PrepConfig, date: NaiveDate) -> Self {
        let stamp = date_stamp(date);
        let (output_root, fell_back) = choose_output_root(cfg);
        if fell_back {
            tracing::warn!(
                "output root {} is not a directory, using {}",
                cfg.output_root.display(),
                cfg.fallback_output_root.display()
            );
        }
        Self {
            download: cfg.download_root.join(&stamp),
            extract: cfg.extract_root.join(&stamp),
            output: output_root.join(&stamp),
        }
    }
}

/// Returns the output root to use and whether it replaced a distinct,
/// unavailable `output_root`.
fn choose_output_root(cfg: &PrepConfig) -> (&Path, bool) {
    if cfg.output_root == cfg.fallback_output_root {
        (cfg.fallback_output_root.as_path(), false)
    } else if cfg.output_root.is_dir() {
        (cfg.output_root.as_path(), false)
    } else {
        (cfg.fallback_output_root.as_path(), true)
    }
}
