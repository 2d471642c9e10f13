//! `osmprep check` – resolve the external tools.

use anyhow::Result;
use osmprep_core::config::PrepConfig;
use osmprep_core::tool;

pub fn run_check(cfg: &PrepConfig) -> Result<()> {
    for (name, path) in tool::check_tools(&cfg.tools)? {
        println!("{:<10}  {}", name, path.display());
    }
    Ok(())
}
