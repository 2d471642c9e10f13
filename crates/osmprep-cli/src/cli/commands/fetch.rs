//! `osmprep fetch <url>` – download a snapshot without processing it.

use anyhow::{Context, Result};
use chrono::Local;
use osmprep_core::config::PrepConfig;
use osmprep_core::fetch;
use osmprep_core::paths::RunDirs;
use std::path::Path;

pub fn run_fetch(cfg: &PrepConfig, url: &str, dir: Option<&Path>, verify_tls: bool) -> Result<()> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => RunDirs::resolve(cfg, Local::now().date_naive()).download,
    };
    let path = fetch::fetch_snapshot(url, &dir, verify_tls)
        .with_context(|| format!("fetching {}", url))?;
    println!("{}", path.display());
    Ok(())
}
