pub mod config;
pub mod core;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{toml_config::RunConfig, RunSettings};
pub use crate::core::{CancelToken, Counter, Driver, DriverOptions, RunSummary, SequenceSink, StopReason};
pub use crate::utils::error::{Result, SeqError};
