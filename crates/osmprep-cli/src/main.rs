use clap::Parser;
use osmprep_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    let loaded = match cli.load_config() {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("osmprep error: {:#}", err);
            std::process::exit(1);
        }
    };

    // Initialize logging before any pipeline work; fall back to stderr only.
    if let Err(err) = logging::init_logging(&loaded.config.log_dir) {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }
    if loaded.created {
        tracing::info!("created default config at {}", loaded.path.display());
    }

    if let Err(err) = cli.command.run(loaded) {
        // `{:?}` carries the cause chain and, with RUST_BACKTRACE=1, the backtrace.
        tracing::error!("osmprep failed: {:?}", err);
        std::process::exit(1);
    }
}
