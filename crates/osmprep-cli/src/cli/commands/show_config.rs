//! `osmprep config` – print the effective configuration and where it was read from.

use anyhow::Result;
use osmprep_core::config::PrepConfig;
use std::io::{self, Write};
use std::path::Path;

pub fn run_show_config(cfg: &PrepConfig, source: &Path) -> Result<()> {
    let stdout = io::stdout();
    write_config(&mut stdout.lock(), cfg, source)
}

/// Writes `# <source>` followed by the TOML rendering of `cfg`.
pub(crate) fn write_config(out: &mut impl Write, cfg: &PrepConfig, source: &Path) -> Result<()> {
    writeln!(out, "# {}", source.display())?;
    write!(out, "{}", toml::to_string_pretty(cfg)?)?;
    out.flush()?;
    Ok(())
}
