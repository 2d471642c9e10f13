//! CLI for the osmprep roadway pipeline.

mod commands;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use osmprep_core::config::{self, LoadedConfig};
use std::path::PathBuf;

use commands::{run_check, run_checksum, run_fetch, run_pipeline, run_show_config};

/// Top-level CLI for osmprep.
#[derive(Debug, Parser)]
#[command(name = "osmprep")]
#[command(
    about = "osmprep: fetch an OSM extract and export its roadways as shapefiles",
    long_about = None
)]
pub struct Cli {
    /// Read configuration from this file instead of ~/.config/osmprep/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

impl Cli {
    pub fn load_config(&self) -> Result<LoadedConfig> {
        match &self.config {
            Some(path) => config::load_from_path(path),
            None => config::load_or_init(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the whole pipeline: fetch, convert, filter, export.
    Run {
        /// Snapshot URL (overrides the configured one).
        #[arg(long)]
        url: Option<String>,
        /// Skip TLS certificate and host name verification.
        #[arg(long)]
        insecure: bool,
        /// Date stamp for the run directories (default: today).
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
        /// Do not check that the external tools exist before downloading.
        #[arg(long)]
        skip_preflight: bool,
    },

    /// Only fetch a snapshot.
    Fetch {
        /// Direct HTTP/HTTPS URL of the snapshot.
        url: String,
        /// Target directory (default: today's download directory).
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Skip TLS certificate and host name verification.
        #[arg(long)]
        insecure: bool,
    },

    /// Check that osmconvert, osmfilter and ogr2ogr can be found.
    Check,

    /// Print the effective configuration as TOML, preceded by its source path.
    Config,

    /// Compute SHA-256 of a file (e.g. a fetched snapshot).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },
}

impl CliCommand {
    pub fn run(self, loaded: LoadedConfig) -> Result<()> {
        tracing::debug!("loaded config from {}: {:?}", loaded.path.display(), loaded.config);
        let cfg = loaded.config;
        match self {
            CliCommand::Run {
                url,
                insecure,
                date,
                skip_preflight,
            } => {
                let mut cfg = cfg;
                if let Some(url) = url {
                    cfg.url = url;
                }
                if insecure {
                    cfg.verify_tls = false;
                }
                let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
                run_pipeline(&cfg, date, skip_preflight)?;
            }
            CliCommand::Fetch { url, dir, insecure } => {
                run_fetch(&cfg, &url, dir.as_deref(), !insecure && cfg.verify_tls)?
            }
            CliCommand::Check => run_check(&cfg)?,
            CliCommand::Config => run_show_config(&cfg, &loaded.path)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
