//! Validation run orchestration.

use crate::comparator::{Comparator, ComparisonReport};
use crate::config::ValidatorConfig;
use crate::decoder::ReceivedResults;
use crate::error::ValidatorError;
use crate::expected::ExpectedResults;
use tracing::info;

/// Loads both inputs and compares them according to a [`ValidatorConfig`].
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
    comparator: Comparator,
}

impl Validator {
    /// Create a validator for a configuration
    pub fn new(config: ValidatorConfig) -> Self {
        let comparator = config.comparator();
        Self { config, comparator }
    }

    /// Use a custom comparator, e.g. with per-key windows
    #[must_use]
    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Configuration in use
    pub const fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Load expected results, decode the output, and compare.
    ///
    /// Expected results are loaded first so a broken fixture is reported
    /// before any decoding work happens.
    pub fn run(&self) -> Result<ComparisonReport, ValidatorError> {
        let expected = ExpectedResults::from_file(&self.config.expected)?;
        let received = ReceivedResults::from_file(&self.config.output)?;

        info!(
            expected_keys = expected.len(),
            received_keys = received.len(),
            records = received.record_count(),
            "inputs loaded"
        );

        let report = self.comparator.compare(&expected, &received)?;
        info!(checked = report.checked, "validation passed");
        Ok(report)
    }
}

/// Validate configuration and run a [`Validator`] for it.
pub fn validate(config: ValidatorConfig) -> Result<ComparisonReport, ValidatorError> {
    config.validate()?;
    Validator::new(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparator::KeyCheck;
    use crate::error::{DecodeError, ExpectedError, ValidationError};
    use crate::record::{Record, RecordWriter};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_output(pairs: &[(u32, u32)]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        let mut writer = RecordWriter::new(file.as_file_mut());
        for (key, value) in pairs {
            writer.write_record(&Record::new(*key, *value)).unwrap();
        }
        writer.finish().unwrap();
        file
    }

    fn write_expected(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn small_validator(output: &NamedTempFile, expected: &NamedTempFile) -> Validator {
        Validator::new(ValidatorConfig::new(output.path(), expected.path()))
            .with_comparator(Comparator::new([KeyCheck::new(1, 2), KeyCheck::new(2, 1)]))
    }

    #[test]
    fn test_run_success() {
        let output = write_output(&[(1, 10), (2, 30), (1, 20)]);
        let expected = write_expected(r#"{"1": [10, 20], "2": [30]}"#);

        let report = small_validator(&output, &expected).run().unwrap();
        assert_eq!(report.checked, 3);
    }

    #[test]
    fn test_run_mismatch() {
        let output = write_output(&[(1, 10), (1, 99)]);
        let expected = write_expected(r#"{"1": [10, 20], "2": [30]}"#);

        let err = small_validator(&output, &expected).run().unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::Validation(ValidationError::Mismatch {
                key: 1,
                position: 1,
                ref expected,
                received: 99
            }) if expected.as_u64() == Some(20)
        ));
    }

    #[test]
    fn test_expected_errors_reported_before_decode_errors() {
        let output = write_expected("garbage");
        let expected = write_expected("{not json");

        let err = small_validator(&output, &expected).run().unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::Expected(ExpectedError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_decode_error_surfaces() {
        let output = write_expected("xy");
        let expected = write_expected(r#"{"1": [10]}"#);

        let err = small_validator(&output, &expected).run().unwrap_err();
        assert!(matches!(
            err,
            ValidatorError::Decode(DecodeError::TruncatedHeader { actual: 2, .. })
        ));
    }

    #[test]
    fn test_config_survives_custom_comparator() {
        let config = ValidatorConfig::new("out.bin", "expected.json").with_window(5);
        let validator = Validator::new(config.clone())
            .with_comparator(Comparator::new([KeyCheck::new(3, 1)]));

        assert_eq!(validator.config().window, 5);
        assert_eq!(validator.config().keys, config.keys);
        assert_eq!(validator.config().output, config.output);
    }

    #[test]
    fn test_validate_checks_config_first() {
        let config = ValidatorConfig::new("/nonexistent/out.bin", "/nonexistent/expected.json");
        assert!(matches!(validate(config), Err(ValidatorError::Config(_))));
    }

    #[test]
    fn test_default_window_over_full_fixture() {
        let pairs: Vec<(u32, u32)> = (0..1000u32)
            .flat_map(|i| [(1, i * 2), (2, i * 3)])
            .collect();
        let output = write_output(&pairs);

        let ones: Vec<u32> = (0..1000).map(|i| i * 2).collect();
        let twos: Vec<u32> = (0..1000).map(|i| i * 3).collect();
        let json = serde_json::json!({ "1": ones, "2": twos }).to_string();
        let expected = write_expected(&json);

        let report = validate(ValidatorConfig::new(output.path(), expected.path())).unwrap();
        assert_eq!(report.checked, 2000);
    }
}
