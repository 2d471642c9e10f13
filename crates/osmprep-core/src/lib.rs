pub mod config;
pub mod logging;

// Pipeline stages, in run order
pub mod fetch;
pub mod convert;
pub mod filter;
pub mod export;
pub mod pipeline;

pub mod checksum;
pub mod paths;
pub mod storage;
pub mod tool;
pub mod url_model;

#[cfg(test)]
mod test_support;
