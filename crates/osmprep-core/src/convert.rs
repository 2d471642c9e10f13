//! PBF → O5M conversion with osmconvert.
//!
//! osmfilter cannot read `.pbf`, so the snapshot is transcoded first. The
//! `.o5m` file is regenerated on every run.

use std::path::{Path, PathBuf};

use crate::paths;
use crate::storage;
use crate::tool::{ToolCommand, ToolError, ToolRunner};

/// Builds `<osmconvert> <source> -o=<o5m>`.
pub fn convert_command(osmconvert: &Path, source: &Path, o5m: &Path) -> ToolCommand {
    ToolCommand::new(osmconvert)
        .arg(source)
        .flag_path("-o=", o5m)
}

/// Converts `source` into `<workdir>/<stem>.o5m` and returns that path.
/// A non-zero exit from osmconvert is returned as an error.
pub fn convert_to_o5m(
    runner: &dyn ToolRunner,
    osmconvert: &Path,
    source: &Path,
    workdir: &Path,
) -> Result<PathBuf, ToolError> {
    storage::ensure_dir(workdir).map_err(ToolError::io(workdir))?;

    let o5m = paths::converted_path(workdir, source);
    tracing::info!("converting {} to o5m: {}", source.display(), o5m.display());
    storage::remove_stale(&o5m).map_err(ToolError::io(&o5m))?;

    runner.run(&convert_command(osmconvert, source, &o5m))?;
    Ok(o5m)
}
