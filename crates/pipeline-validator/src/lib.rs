//! Pipeline output validator.
//!
//! This crate checks the binary output of a data-processing application
//! against a precomputed expected-results fixture:
//! - Expected results are a JSON object mapping integer keys to value arrays
//! - Output is a stream of length-prefixed big-endian key/value records
//! - The leading values of selected keys are compared position by position
//!
//! # Architecture
//!
//! The validator uses a library-first design with the following components:
//! - `config`: Configuration loading and validation
//! - `expected`: Expected-results JSON loading and key normalization
//! - `record`: Record wire format and encoder
//! - `decoder`: Streaming record decoder and received-values mapping
//! - `comparator`: Ordered, fail-fast positional comparison
//! - `validator`: Orchestration of a full run
//!
//! # Example
//!
//! ```no_run
//! use pipeline_validator::{ValidatorConfig, validate};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ValidatorConfig::new("output.bin", "expected.json")
//!         .with_keys([1, 2])
//!         .with_window(1000);
//!
//!     let report = validate(config)?;
//!     println!("{} positions matched", report.checked);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

// Module declarations
pub mod comparator;
pub mod config;
pub mod decoder;
pub mod error;
pub mod expected;
pub mod record;
pub mod validator;

// Re-exports for public API
pub use comparator::{
    Comparator, ComparisonMode, ComparisonReport, DEFAULT_KEYS, DEFAULT_WINDOW, KeyCheck,
};
pub use config::{LogLevel, ValidatorConfig};
pub use decoder::{ReceivedResults, RecordDecoder};
pub use error::{ConfigError, DecodeError, ExpectedError, ValidationError, ValidatorError};
pub use expected::ExpectedResults;
pub use record::{Record, RecordWriter, encode_records};
pub use validator::{Validator, validate};
