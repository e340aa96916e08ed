//! Error types for the pipeline validator.
//!
//! All errors use thiserror for consistent error handling across the codebase.
//! Input problems (`ExpectedError`, `DecodeError`, `ConfigError`) and assertion
//! failures (`ValidationError`) are kept apart so callers can tell a broken
//! fixture from a wrong answer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the expected-results JSON document.
#[derive(Debug, Error)]
pub enum ExpectedError {
    /// Failed to open the expected-results file
    #[error("Failed to open expected results {path}: {source}")]
    Open {
        /// Path to the JSON file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Document is not a JSON object of integer arrays
    #[error("Invalid JSON in expected results: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Object key does not spell an integer
    #[error("Invalid key in expected results: '{0}' is not an integer")]
    InvalidKey(String),

    /// Two object keys normalize to the same integer
    #[error("Duplicate key {key} in expected results ('{first}' and '{second}')")]
    DuplicateKey {
        /// Normalized integer key
        key: i128,
        /// First spelling seen
        first: String,
        /// Conflicting spelling
        second: String,
    },
}

/// Errors raised while decoding the binary output stream.
///
/// `record` is the zero-based index of the record being decoded and `offset`
/// the byte position where its length prefix starts.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to open the output file
    #[error("Failed to open output {path}: {source}")]
    Open {
        /// Path to the binary output file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading a record
    #[error("I/O error in record {record} at offset {offset}: {source}")]
    Io {
        /// Record index
        record: u64,
        /// Byte offset of the record
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stream ended inside a length prefix
    #[error("Truncated header in record {record} at offset {offset}: got {actual} of 4 bytes")]
    TruncatedHeader {
        /// Record index
        record: u64,
        /// Byte offset of the record
        offset: u64,
        /// Bytes available before end of stream
        actual: usize,
    },

    /// Length prefix announced an empty payload
    #[error("Empty payload in record {record} at offset {offset}")]
    EmptyPayload {
        /// Record index
        record: u64,
        /// Byte offset of the record
        offset: u64,
    },

    /// Stream ended inside a payload
    #[error(
        "Truncated payload in record {record} at offset {offset}: expected {expected} bytes, got {actual}"
    )]
    TruncatedPayload {
        /// Record index
        record: u64,
        /// Byte offset of the record
        offset: u64,
        /// Length announced by the header
        expected: u32,
        /// Bytes available before end of stream
        actual: usize,
    },

    /// Payload is not a key/value pair
    #[error(
        "Invalid payload length in record {record} at offset {offset}: {length} bytes (expected 8)"
    )]
    InvalidPayloadLength {
        /// Record index
        record: u64,
        /// Byte offset of the record
        offset: u64,
        /// Length announced by the header
        length: u32,
    },

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Comparison failures.
///
/// Every variant identifies the key and position where checking stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Key is absent from the expected results
    #[error("key: {key}, position: {position}, expected key missing from expected results")]
    MissingExpectedKey {
        /// Checked key
        key: u32,
        /// Position being checked
        position: usize,
    },

    /// Key never appeared in the output stream
    #[error("key: {key}, position: {position}, key missing from received output")]
    MissingReceivedKey {
        /// Checked key
        key: u32,
        /// Position being checked
        position: usize,
    },

    /// Expected sequence is shorter than the window
    #[error("key: {key}, position: {position}, expected results only hold {len} values")]
    ExpectedIndexOutOfRange {
        /// Checked key
        key: u32,
        /// Position being checked
        position: usize,
        /// Length of the expected sequence
        len: usize,
    },

    /// Received sequence is shorter than the window
    #[error("key: {key}, position: {position}, received output only holds {len} values")]
    ReceivedIndexOutOfRange {
        /// Checked key
        key: u32,
        /// Position being checked
        position: usize,
        /// Length of the received sequence
        len: usize,
    },

    /// Values differ
    #[error("key: {key}, position: {position}, expected: {expected}, received: {received}")]
    Mismatch {
        /// Checked key
        key: u32,
        /// Position of the divergence
        position: usize,
        /// Value from the expected results, exactly as the fixture spells it
        expected: serde_json::Number,
        /// Value decoded from the output
        received: u32,
    },

    /// Several failures collected in exhaustive mode
    #[error("{count} comparison failures, first: {first}")]
    Multiple {
        /// Total number of failures
        count: usize,
        /// First failure in check order
        first: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Key at which this failure occurred.
    #[must_use]
    pub fn key(&self) -> u32 {
        match self {
            Self::MissingExpectedKey { key, .. }
            | Self::MissingReceivedKey { key, .. }
            | Self::ExpectedIndexOutOfRange { key, .. }
            | Self::ReceivedIndexOutOfRange { key, .. }
            | Self::Mismatch { key, .. } => *key,
            Self::Multiple { first, .. } => first.key(),
        }
    }

    /// Position at which this failure occurred.
    #[must_use]
    pub fn position(&self) -> usize {
        match self {
            Self::MissingExpectedKey { position, .. }
            | Self::MissingReceivedKey { position, .. }
            | Self::ExpectedIndexOutOfRange { position, .. }
            | Self::ReceivedIndexOutOfRange { position, .. }
            | Self::Mismatch { position, .. } => *position,
            Self::Multiple { first, .. } => first.position(),
        }
    }

    /// Whether the failure is a lookup failure rather than a value mismatch.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(
            self,
            Self::MissingExpectedKey { .. }
                | Self::MissingReceivedKey { .. }
                | Self::ExpectedIndexOutOfRange { .. }
                | Self::ReceivedIndexOutOfRange { .. }
        )
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input file does not exist
    #[error("{what} file not found: {path}")]
    MissingFile {
        /// Which input ("output" or "expected")
        what: &'static str,
        /// Configured path
        path: PathBuf,
    },

    /// Window of zero positions
    #[error("Invalid window size {0}: must be at least 1")]
    InvalidWindow(usize),

    /// Nothing to check
    #[error("No keys configured for comparison")]
    NoKeys,
}

/// Top-level validator errors.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Expected results could not be loaded
    #[error("Expected results error: {0}")]
    Expected(#[from] ExpectedError),

    /// Output stream could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Comparison failed
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message() {
        let err = ValidationError::Mismatch {
            key: 1,
            position: 1,
            expected: serde_json::Number::from(20u32),
            received: 99,
        };
        assert_eq!(
            err.to_string(),
            "key: 1, position: 1, expected: 20, received: 99"
        );

        let wide: serde_json::Number = serde_json::from_str("18446744073709551616").unwrap();
        let err = ValidationError::Mismatch {
            key: 3,
            position: 0,
            expected: wide,
            received: 0,
        };
        assert_eq!(
            err.to_string(),
            "key: 3, position: 0, expected: 18446744073709551616, received: 0"
        );
    }

    #[test]
    fn test_decode_error_messages() {
        let err = DecodeError::EmptyPayload {
            record: 3,
            offset: 36,
        };
        assert_eq!(err.to_string(), "Empty payload in record 3 at offset 36");

        let err = DecodeError::TruncatedPayload {
            record: 0,
            offset: 0,
            expected: 8,
            actual: 5,
        };
        assert_eq!(
            err.to_string(),
            "Truncated payload in record 0 at offset 0: expected 8 bytes, got 5"
        );
    }

    #[test]
    fn test_multiple_reports_first_location() {
        let first = ValidationError::ReceivedIndexOutOfRange {
            key: 2,
            position: 7,
            len: 7,
        };
        let err = ValidationError::Multiple {
            count: 3,
            first: Box::new(first),
        };
        assert_eq!(err.key(), 2);
        assert_eq!(err.position(), 7);
        assert!(!err.is_lookup());
        assert!(err.to_string().starts_with("3 comparison failures"));
    }

    #[test]
    fn test_validator_error_conversion() {
        let err: ValidatorError = ConfigError::NoKeys.into();
        assert!(err.to_string().contains("No keys configured"));
    }
}
