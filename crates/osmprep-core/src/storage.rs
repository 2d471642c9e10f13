//! Disk I/O and artifact lifecycle.
//!
//! Every stage regenerates its output from scratch: the output directory is
//! created on demand and a stale artifact is removed before the tool writes a
//! new one. The fetched snapshot goes through a `.part` file that is renamed
//! onto the final name only once the transfer completed.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.osm.pbf` → `a.osm.pbf.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Creates `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    tracing::info!("creating directory {}", dir.display());
    fs::create_dir_all(dir)
}

/// Removes a previous run's artifact at `path`. Returns true if something was removed.
pub fn remove_stale(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("file exists, removed {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Sequential writer for a download in progress. Bytes land in `<final>.part`;
/// [`PartFile::finalize`] replaces whatever sits at the final path.
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Create the parent directory if needed and open a truncated `.part` file.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        if let Some(parent) = final_path.parent() {
            ensure_dir(parent)?;
        }
        let temp_path = temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(Self {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Sync, remove the previous file at the final path and rename the `.part` onto it.
    pub fn finalize(self) -> io::Result<PathBuf> {
        self.file.sync_all()?;
        drop(self.file);
        remove_stale(&self.final_path)?;
        fs::rename(&self.temp_path, &self.final_path)?;
        Ok(self.final_path)
    }

    /// Drop the `.part` file without touching the final path.
    pub fn discard(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.temp_path);
    }
}
