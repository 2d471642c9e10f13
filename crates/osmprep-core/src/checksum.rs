//! SHA-256 fingerprint of a fetched snapshot.
//!
//! Computed after the transfer finished, not inline with it, and logged so
//! consecutive daily runs can be told apart.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Size and digest of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub len: u64,
    /// Lowercase hex SHA-256.
    pub sha256: String,
}

/// Hash `path` in fixed-size chunks; memory use does not grow with the file.
pub fn digest_path(path: &Path) -> Result<FileDigest> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut len = 0u64;
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        len += n as u64;
    }
    Ok(FileDigest {
        len,
        sha256: hex::encode(hasher.finalize()),
    })
}
