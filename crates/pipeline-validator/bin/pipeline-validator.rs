//! Pipeline validator binary entry point.
//!
//! This is a thin wrapper around the pipeline-validator library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging (to stderr, so a passing run prints nothing)
//! 3. Validates configuration
//! 4. Runs the comparison
//!
//! Any failure exits non-zero with the diagnostic on stderr.

use anyhow::Result;
use pipeline_validator::{Validator, ValidatorConfig};

fn main() -> Result<()> {
    let config = ValidatorConfig::from_args();

    // RUST_LOG takes precedence over --log-level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let validator = Validator::new(config);
    let config = validator.config();

    tracing::debug!(
        "Configuration loaded: output={}, expected={}, keys={:?}, window={}",
        config.output.display(),
        config.expected.display(),
        config.keys,
        config.window
    );

    config.validate()?;

    validator.run()?;

    Ok(())
}
