//! Expected-results loading.
//!
//! The fixture is a JSON object whose member names are decimal integers and
//! whose values are arrays of integers:
//!
//! ```json
//! { "1": [10, 20, 30], "2": [5, 6] }
//! ```
//!
//! JSON object keys are always strings, so they are normalized to integers on
//! load. A key spelling an integer too wide to ever name a record key is
//! skipped. Values are kept as JSON numbers; one that no `u32` can equal is
//! reported as a mismatch when its position is checked, and ignored otherwise.

use crate::error::ExpectedError;
use serde_json::Number;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Ground-truth values per key, immutable once loaded.
///
/// Values stay as JSON numbers so that a fixture holding integers outside
/// any machine range, or non-integral numbers, still loads; such values simply
/// never equal a decoded `u32`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedResults {
    values: BTreeMap<i128, Vec<Number>>,
}

impl ExpectedResults {
    /// Load expected results from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ExpectedError` if:
    /// - File cannot be opened
    /// - JSON is malformed or not an object of number arrays
    /// - A key is not an integer, or two keys name the same integer
    pub fn from_file(path: &Path) -> Result<Self, ExpectedError> {
        let file = File::open(path).map_err(|source| ExpectedError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let results = Self::from_reader(BufReader::new(file))?;
        debug!(
            "Loaded {} expected keys from {}",
            results.len(),
            path.display()
        );
        Ok(results)
    }

    /// Load expected results from any reader producing a JSON document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ExpectedError> {
        let raw: BTreeMap<String, Vec<Number>> = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    /// Load expected results from an in-memory JSON document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ExpectedError> {
        let raw: BTreeMap<String, Vec<Number>> = serde_json::from_slice(bytes)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: BTreeMap<String, Vec<Number>>) -> Result<Self, ExpectedError> {
        let mut values = BTreeMap::new();
        let mut spellings: BTreeMap<i128, String> = BTreeMap::new();

        for (name, sequence) in raw {
            let Some(key) = parse_key(&name)? else {
                debug!("Skipping expected key '{name}': outside the comparable key range");
                continue;
            };
            match spellings.entry(key) {
                Entry::Occupied(first) => {
                    return Err(ExpectedError::DuplicateKey {
                        key,
                        first: first.get().clone(),
                        second: name,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(name);
                }
            }
            values.insert(key, sequence);
        }

        Ok(Self { values })
    }

    /// Expected sequence for a key
    pub fn get(&self, key: i128) -> Option<&[Number]> {
        self.values.get(&key).map(Vec::as_slice)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = i128> + '_ {
        self.values.keys().copied()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys were loaded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(i128, Vec<Number>)> for ExpectedResults {
    fn from_iter<T: IntoIterator<Item = (i128, Vec<Number>)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Whether an expected JSON number equals a decoded value.
///
/// Integral floats such as `7.0` compare equal to `7`.
pub fn matches_received(expected: &Number, received: u32) -> bool {
    expected.as_u64().map_or_else(
        || expected.as_f64() == Some(f64::from(received)),
        |value| value == u64::from(received),
    )
}

/// Parse a JSON member name as an integer key.
///
/// Surrounding whitespace and a leading sign are accepted. An integer too wide
/// for `i128` can never name a decoded `u32` key and yields `None`.
fn parse_key(name: &str) -> Result<Option<i128>, ExpectedError> {
    let trimmed = name.trim();
    if let Ok(key) = trimmed.parse::<i128>() {
        return Ok(Some(key));
    }

    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(None)
    } else {
        Err(ExpectedError::InvalidKey(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn numbers(values: &[u64]) -> Vec<Number> {
        values.iter().copied().map(Number::from).collect()
    }

    #[test]
    fn test_keys_normalized_to_integers() {
        let results = ExpectedResults::from_slice(br#"{"1": [10, 20], "2": [30]}"#).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results.get(1), Some(&numbers(&[10, 20])[..]));
        assert_eq!(results.get(2), Some(&numbers(&[30])[..]));
        assert_eq!(results.get(3), None);
    }

    #[test]
    fn test_keys_in_numeric_order() {
        let results = ExpectedResults::from_slice(br#"{"10": [], "9": [], "-1": []}"#).unwrap();
        assert_eq!(results.keys().collect::<Vec<_>>(), vec![-1, 9, 10]);
    }

    #[test]
    fn test_key_whitespace_and_sign() {
        let results = ExpectedResults::from_slice(br#"{" 7 ": [1], "+8": [2]}"#).unwrap();
        assert_eq!(results.get(7), Some(&numbers(&[1])[..]));
        assert_eq!(results.get(8), Some(&numbers(&[2])[..]));
    }

    #[test]
    fn test_non_integer_key_rejected() {
        let err = ExpectedResults::from_slice(br#"{"one": [1]}"#).unwrap_err();
        assert!(matches!(err, ExpectedError::InvalidKey(ref k) if k == "one"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let err = ExpectedResults::from_slice(br#"{"1": [1], "01": [2]}"#).unwrap_err();
        assert!(matches!(err, ExpectedError::DuplicateKey { key: 1, .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            ExpectedResults::from_slice(b"{\"1\": [1, 2"),
            Err(ExpectedError::InvalidJson(_))
        ));
        assert!(matches!(
            ExpectedResults::from_slice(b"[1, 2, 3]"),
            Err(ExpectedError::InvalidJson(_))
        ));
        assert!(matches!(
            ExpectedResults::from_slice(br#"{"1": ["a"]}"#),
            Err(ExpectedError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_oversized_key_skipped() {
        let results = ExpectedResults::from_slice(
            br#"{"1": [10], "2": [30], "99999999999999999999999999999999999999999": [1]}"#,
        )
        .unwrap();
        assert_eq!(results.keys().collect::<Vec<_>>(), vec![1, 2]);

        let results = ExpectedResults::from_slice(br#"{"99999999999999999999": [1]}"#).unwrap();
        assert_eq!(
            results.get(99_999_999_999_999_999_999),
            Some(&numbers(&[1])[..])
        );
    }

    #[test]
    fn test_malformed_oversized_key_rejected() {
        let err =
            ExpectedResults::from_slice(br#"{"99999999999999999999999999999999999999999x": [1]}"#)
                .unwrap_err();
        assert!(matches!(err, ExpectedError::InvalidKey(_)));
        assert!(matches!(
            ExpectedResults::from_slice(br#"{"-": [1]}"#),
            Err(ExpectedError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_out_of_range_values_load() {
        let results = ExpectedResults::from_slice(
            br#"{"1": [10], "2": [30], "3": [18446744073709551616, -5, 2.5]}"#,
        )
        .unwrap();
        let values = results.get(3).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0].to_string(), "18446744073709551616");
        assert!(!values.iter().any(|v| matches_received(v, u32::MAX)));
    }

    #[test]
    fn test_matches_received() {
        assert!(matches_received(&Number::from(7u32), 7));
        assert!(!matches_received(&Number::from(-7i64), 7));
        assert!(matches_received(&Number::from_f64(7.0).unwrap(), 7));
        assert!(!matches_received(&Number::from_f64(7.5).unwrap(), 7));
        assert!(matches_received(&Number::from(u64::from(u32::MAX)), u32::MAX));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"1": [1, 2, 3]}"#).unwrap();

        let results = ExpectedResults::from_file(file.path()).unwrap();
        assert_eq!(results.get(1), Some(&numbers(&[1, 2, 3])[..]));
    }

    #[test]
    fn test_from_file_missing() {
        let err = ExpectedResults::from_file(Path::new("/nonexistent/expected.json")).unwrap_err();
        assert!(matches!(err, ExpectedError::Open { .. }));
    }
}
