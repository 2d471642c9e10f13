//! Shapefile export with ogr2ogr, one invocation per OSM layer.
//!
//! Unlike the earlier stages a failure here is not fatal: a small extract may
//! simply have nothing for some layer. Each layer's outcome is recorded in an
//! [`ExportReport`] and the loop always attempts all five layers.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::storage;
use crate::tool::{error_chain, ToolCommand, ToolError, ToolRunner};

/// Output format selector passed to `ogr2ogr -f`.
pub const OGR_FORMAT: &str = "ESRI Shapefile";

/// Layers exposed by GDAL's OSM driver, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Points,
    Lines,
    MultiLineStrings,
    MultiPolygons,
    OtherRelations,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Points,
        Layer::Lines,
        Layer::MultiLineStrings,
        Layer::MultiPolygons,
        Layer::OtherRelations,
    ];

    /// Layer name as ogr2ogr expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Points => "points",
            Layer::Lines => "lines",
            Layer::MultiLineStrings => "multilinestrings",
            Layer::MultiPolygons => "multipolygons",
            Layer::OtherRelations => "other_relations",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of exporting one layer.
#[derive(Debug)]
pub struct LayerOutcome {
    pub layer: Layer,
    pub path: PathBuf,
    /// `None` when the layer exported cleanly.
    pub error: Option<ToolError>,
}

impl LayerOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-layer outcomes in [`Layer::ALL`] order.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub outcomes: Vec<LayerOutcome>,
}

impl ExportReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &LayerOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &LayerOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(LayerOutcome::is_success)
    }
}

/// Builds `<ogr2ogr> -f "ESRI Shapefile" <output> <input> <layer>`.
pub fn export_command(ogr2ogr: &Path, output: &Path, input: &Path, layer: Layer) -> ToolCommand {
    ToolCommand::new(ogr2ogr)
        .arg("-f")
        .arg(OGR_FORMAT)
        .arg(output)
        .arg(input)
        .arg(layer.as_str())
}

fn export_layer(
    runner: &dyn ToolRunner,
    ogr2ogr: &Path,
    input: &Path,
    output: &Path,
    layer: Layer,
) -> Result<(), ToolError> {
    storage::remove_stale(output).map_err(ToolError::io(output))?;
    tracing::info!(layer = %layer, "saving as {}", output.display());
    runner.run(&export_command(ogr2ogr, output, input, layer))
}

/// Exports every layer of `filtered` to `<output_dir>/<output_name>_<layer>.shp`.
///
/// Only a failure to create `output_dir` is returned as an error; per-layer
/// failures are logged and recorded in the report.
pub fn export_shapefiles(
    runner: &dyn ToolRunner,
    ogr2ogr: &Path,
    filtered: &Path,
    output_dir: &Path,
    output_name: &str,
) -> Result<ExportReport, ToolError> {
    tracing::info!("extracting OSM layers as shapefiles into {}", output_dir.display());
    storage::ensure_dir(output_dir).map_err(ToolError::io(output_dir))?;

    let mut report = ExportReport::default();
    for layer in Layer::ALL {
        let path = paths::layer_output_path(output_dir, output_name, layer.as_str());
        let error = export_layer(runner, ogr2ogr, filtered, &path, layer).err();
        if let Some(err) = &error {
            tracing::error!(
                layer = %layer,
                "exception on the {} layer, skipping: {}",
                layer,
                error_chain(err)
            );
        }
        report.outcomes.push(LayerOutcome { layer, path, error });
    }

    tracing::info!(
        "exported {} of {} layers",
        report.succeeded().count(),
        report.outcomes.len()
    );
    Ok(report)
}
