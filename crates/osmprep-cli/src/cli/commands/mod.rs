//! CLI command handlers. Each command is in its own file.

mod check;
mod checksum;
mod fetch;
mod run;
mod show_config;

pub use check::run_check;
pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use run::run_pipeline;
pub use show_config::run_show_config;
#[cfg(test)]
pub(crate) use show_config::write_config;
