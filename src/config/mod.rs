pub mod toml_config;

use crate::core::{DriverOptions, OutputFormat};
use toml_config::RunConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_optional_positive, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "byteseq")]
#[command(about = "Prints every byte sequence in base-256 counting order")]
pub struct CliConfig {
    /// Optional TOML run file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Stop after this many lines
    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Stop before emitting a sequence longer than this
    #[arg(long)]
    pub max_length: Option<u64>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Flush stdout every N lines
    #[arg(long)]
    pub flush_every: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log process memory while running")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }
        validate_optional_positive("max_iterations", self.max_iterations)?;
        validate_optional_positive("max_length", self.max_length)?;
        validate_optional_positive("flush_every", self.flush_every)?;
        Ok(())
    }
}

pub const DEFAULT_FLUSH_EVERY: u64 = 4096;

/// Effective settings after merging the run file with command line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub max_iterations: Option<u64>,
    pub max_length: Option<u64>,
    pub format: OutputFormat,
    pub flush_every: u64,
    pub monitor: bool,
    pub monitor_every: Option<u64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            max_iterations: None,
            max_length: None,
            format: OutputFormat::Decimal,
            flush_every: DEFAULT_FLUSH_EVERY,
            monitor: false,
            monitor_every: None,
        }
    }
}

impl RunSettings {
    pub fn from_file(file: &RunConfig) -> Self {
        let defaults = Self::default();
        Self {
            max_iterations: file.run.max_iterations,
            max_length: file.run.max_length,
            format: file.run.format.unwrap_or(defaults.format),
            flush_every: file.run.flush_every.unwrap_or(defaults.flush_every),
            monitor: file.monitoring_enabled(),
            monitor_every: file.monitoring.as_ref().and_then(|m| m.every_iterations),
        }
    }

    /// Command line values win over the run file.
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig, file: Option<&RunConfig>) -> Self {
        let base = file.map(Self::from_file).unwrap_or_default();
        Self {
            max_iterations: cli.max_iterations.or(base.max_iterations),
            max_length: cli.max_length.or(base.max_length),
            format: cli.format.unwrap_or(base.format),
            flush_every: cli.flush_every.unwrap_or(base.flush_every),
            monitor: cli.monitor || base.monitor,
            monitor_every: base.monitor_every,
        }
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            max_iterations: self.max_iterations,
            max_length: self
                .max_length
                .map(|len| usize::try_from(len).unwrap_or(usize::MAX)),
            monitor_every: if self.monitor { self.monitor_every } else { None },
        }
    }
}
