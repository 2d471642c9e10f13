//! Checksum command: compute SHA-256 of a file.

use anyhow::Result;
use osmprep_core::checksum;
use std::path::Path;

/// Compute and print SHA-256 of the given file.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::digest_path(path)?;
    println!("{}  {}", digest.sha256, path.display());
    Ok(())
}
