//! Validator configuration management.
//!
//! This module handles loading and validating the validator configuration from
//! CLI arguments and environment variables.
//!
//! # Configuration Sources
//!
//! Configuration can be provided via:
//! - CLI arguments (`--output`, `--expected`, etc.)
//! - Environment variables (`PIPELINE_VALIDATOR_OUTPUT`, etc.)
//! - Default values (keys `1,2`, window `1000`)
//!
//! # Example
//!
//! ```no_run
//! use pipeline_validator::ValidatorConfig;
//!
//! // Load from CLI args and environment
//! let config = ValidatorConfig::from_args();
//!
//! // Validate configuration
//! config.validate().expect("Invalid configuration");
//!
//! println!("Decoding: {}", config.output.display());
//! println!("Expected: {}", config.expected.display());
//! ```

use crate::comparator::{Comparator, ComparisonMode, DEFAULT_KEYS, DEFAULT_WINDOW};
use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;

/// Validator configuration loaded from CLI args and environment variables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipeline-validator",
    about = "Validate pipeline output records against an expected-results fixture",
    version
)]
pub struct ValidatorConfig {
    /// Binary output file of the application under test
    #[arg(long, env = "PIPELINE_VALIDATOR_OUTPUT")]
    pub output: PathBuf,

    /// Expected-results JSON file
    #[arg(long, env = "PIPELINE_VALIDATOR_EXPECTED")]
    pub expected: PathBuf,

    /// Keys to compare, comma-separated
    #[arg(
        long,
        env = "PIPELINE_VALIDATOR_KEYS",
        value_delimiter = ',',
        default_values_t = DEFAULT_KEYS
    )]
    pub keys: Vec<u32>,

    /// Number of leading positions compared per key
    #[arg(long, env = "PIPELINE_VALIDATOR_WINDOW", default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Report every failure instead of stopping at the first
    #[arg(long)]
    pub report_all: bool,

    /// Log level used when `RUST_LOG` is unset
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,
}

/// Log verbosity for the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Per-record tracing
    Trace,
    /// Load and decode summaries
    Debug,
    /// Progress messages
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl LogLevel {
    /// Directive string for `tracing_subscriber::EnvFilter`
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl ValidatorConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Configuration with default keys and window.
    pub fn new(output: impl Into<PathBuf>, expected: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            expected: expected.into(),
            keys: DEFAULT_KEYS.to_vec(),
            window: DEFAULT_WINDOW,
            report_all: false,
            log_level: LogLevel::Warn,
        }
    }

    /// Replace the compared keys
    #[must_use]
    pub fn with_keys(mut self, keys: impl IntoIterator<Item = u32>) -> Self {
        self.keys = keys.into_iter().collect();
        self
    }

    /// Replace the window size
    #[must_use]
    pub const fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the failure mode
    #[must_use]
    pub const fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.report_all = matches!(mode, ComparisonMode::Exhaustive);
        self
    }

    /// Failure mode selected by `--report-all`
    pub const fn mode(&self) -> ComparisonMode {
        if self.report_all {
            ComparisonMode::Exhaustive
        } else {
            ComparisonMode::FailFast
        }
    }

    /// Comparator for the configured keys, window and mode
    pub fn comparator(&self) -> Comparator {
        Comparator::uniform(self.keys.iter().copied(), self.window).with_mode(self.mode())
    }

    /// Validate configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Either input file doesn't exist
    /// - The window is zero
    /// - No keys are configured
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.output.exists() {
            return Err(ConfigError::MissingFile {
                what: "output",
                path: self.output.clone(),
            });
        }

        if !self.expected.exists() {
            return Err(ConfigError::MissingFile {
                what: "expected",
                path: self.expected.clone(),
            });
        }

        if self.window == 0 {
            return Err(ConfigError::InvalidWindow(self.window));
        }

        if self.keys.is_empty() {
            return Err(ConfigError::NoKeys);
        }

        Ok(())
    }
}
