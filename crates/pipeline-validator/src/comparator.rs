//! Positional comparison of expected and received sequences.
//!
//! Checks run in ascending key order and, within a key, in ascending position
//! order. At every position the expected value is looked up first, then the
//! received value, then the two are compared, so the reported failure is the
//! same no matter how many later positions would also fail.

use crate::decoder::ReceivedResults;
use crate::error::ValidationError;
use crate::expected::{ExpectedResults, matches_received};
use serde_json::Number;
use tracing::{debug, warn};

/// Number of positions compared per key by default
pub const DEFAULT_WINDOW: usize = 1000;

/// Keys compared by default
pub const DEFAULT_KEYS: [u32; 2] = [1, 2];

/// One key and the number of leading positions to compare for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCheck {
    /// Key to compare
    pub key: u32,
    /// Leading positions to compare
    pub window: usize,
}

impl KeyCheck {
    /// Create a check
    pub const fn new(key: u32, window: usize) -> Self {
        Self { key, window }
    }
}

/// How the comparator reacts to a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Stop at the first failure
    #[default]
    FailFast,
    /// Record every failure and keep going
    Exhaustive,
}

/// Outcome of a comparison run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonReport {
    /// Positions compared successfully
    pub checked: usize,
    /// Failures in check order
    pub failures: Vec<ValidationError>,
}

impl ComparisonReport {
    /// Whether every position matched
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Convert into a `Result`, keeping the report on success.
    ///
    /// A single failure is returned as-is; several are wrapped in
    /// [`ValidationError::Multiple`].
    pub fn into_result(mut self) -> Result<Self, ValidationError> {
        match self.failures.len() {
            0 => Ok(self),
            1 => Err(self.failures.remove(0)),
            count => Err(ValidationError::Multiple {
                count,
                first: Box::new(self.failures.swap_remove(0)),
            }),
        }
    }
}

/// Compares received sequences against expected ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    checks: Vec<KeyCheck>,
    mode: ComparisonMode,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::uniform(DEFAULT_KEYS, DEFAULT_WINDOW)
    }
}

impl Comparator {
    /// Build a comparator from explicit checks.
    ///
    /// Checks are sorted by key. When a key appears twice the larger window
    /// wins.
    pub fn new(checks: impl IntoIterator<Item = KeyCheck>) -> Self {
        let mut checks: Vec<KeyCheck> = checks.into_iter().collect();
        checks.sort_unstable_by(|a, b| a.key.cmp(&b.key).then(b.window.cmp(&a.window)));
        checks.dedup_by_key(|check| check.key);
        Self {
            checks,
            mode: ComparisonMode::FailFast,
        }
    }

    /// Same window for every key
    pub fn uniform(keys: impl IntoIterator<Item = u32>, window: usize) -> Self {
        Self::new(keys.into_iter().map(|key| KeyCheck::new(key, window)))
    }

    /// Set the failure mode
    #[must_use]
    pub const fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks in evaluation order
    pub fn checks(&self) -> &[KeyCheck] {
        &self.checks
    }

    /// Failure mode
    pub const fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Run every check and collect the outcome.
    ///
    /// In fail-fast mode the report holds at most one failure.
    pub fn run(&self, expected: &ExpectedResults, received: &ReceivedResults) -> ComparisonReport {
        let mut report = ComparisonReport::default();

        for check in &self.checks {
            let before = report.failures.len();
            self.run_check(*check, expected, received, &mut report);

            if report.failures.len() > before && self.mode == ComparisonMode::FailFast {
                break;
            }
        }

        debug!(
            "Compared {} positions across {} keys, {} failures",
            report.checked,
            self.checks.len(),
            report.failures.len()
        );
        report
    }

    /// Run every check, returning the first failure.
    pub fn compare(
        &self,
        expected: &ExpectedResults,
        received: &ReceivedResults,
    ) -> Result<ComparisonReport, ValidationError> {
        self.run(expected, received).into_result()
    }

    fn run_check(
        &self,
        check: KeyCheck,
        expected: &ExpectedResults,
        received: &ReceivedResults,
        report: &mut ComparisonReport,
    ) {
        let KeyCheck { key, window } = check;
        let expected_values = expected.get(i128::from(key));
        let received_values = received.get(key);

        for position in 0..window {
            let outcome = lookup(key, position, expected_values, received_values).and_then(
                |(want, got)| {
                    if matches_received(want, got) {
                        Ok(())
                    } else {
                        Err(ValidationError::Mismatch {
                            key,
                            position,
                            expected: want.clone(),
                            received: got,
                        })
                    }
                },
            );

            match outcome {
                Ok(()) => report.checked += 1,
                Err(failure) => {
                    let stop_key = failure.is_lookup();
                    if self.mode == ComparisonMode::Exhaustive {
                        warn!("{failure}");
                    }
                    report.failures.push(failure);
                    // Lookups past a missing key or a short sequence fail the same way
                    if stop_key || self.mode == ComparisonMode::FailFast {
                        return;
                    }
                }
            }
        }
    }
}

/// Fetch the expected and received value at `position`, expected side first.
fn lookup<'a>(
    key: u32,
    position: usize,
    expected: Option<&'a [Number]>,
    received: Option<&[u32]>,
) -> Result<(&'a Number, u32), ValidationError> {
    let expected = expected.ok_or(ValidationError::MissingExpectedKey { key, position })?;
    let want = expected
        .get(position)
        .ok_or(ValidationError::ExpectedIndexOutOfRange {
            key,
            position,
            len: expected.len(),
        })?;

    let received = received.ok_or(ValidationError::MissingReceivedKey { key, position })?;
    let got = *received
        .get(position)
        .ok_or(ValidationError::ReceivedIndexOutOfRange {
            key,
            position,
            len: received.len(),
        })?;

    Ok((want, got))
}
