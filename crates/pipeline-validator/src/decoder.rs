//! Streaming decoder for the binary output file.
//!
//! Records are decoded one at a time with no lookahead beyond the current
//! record. End of stream exactly at a record boundary ends decoding cleanly;
//! end of stream anywhere else is an error.

use crate::error::DecodeError;
use crate::record::{HEADER_SIZE, PAYLOAD_SIZE, Record};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::{debug, trace};

/// Iterator over the records of a wire-format stream.
///
/// Yields `None` after the first error.
#[derive(Debug)]
pub struct RecordDecoder<R> {
    reader: R,
    record: u64,
    offset: u64,
    finished: bool,
}

impl<R: Read> RecordDecoder<R> {
    /// Wrap a reader positioned at the start of a record
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            record: 0,
            offset: 0,
            finished: false,
        }
    }

    /// Number of records decoded so far
    pub const fn records_decoded(&self) -> u64 {
        self.record
    }

    /// Bytes consumed so far
    pub const fn bytes_consumed(&self) -> u64 {
        self.offset
    }

    /// Decode the next record, or `None` at a clean end of stream.
    pub fn read_record(&mut self) -> Result<Option<Record>, DecodeError> {
        let record = self.record;
        let offset = self.offset;

        let mut header = [0u8; HEADER_SIZE];
        let filled = self.fill(&mut header)?;
        match filled {
            0 => return Ok(None),
            HEADER_SIZE => {}
            actual => {
                return Err(DecodeError::TruncatedHeader {
                    record,
                    offset,
                    actual,
                });
            }
        }

        let length = u32::from_be_bytes(header);
        if length == 0 {
            return Err(DecodeError::EmptyPayload { record, offset });
        }
        if length != PAYLOAD_SIZE {
            return Err(DecodeError::InvalidPayloadLength {
                record,
                offset,
                length,
            });
        }

        let mut payload = [0u8; PAYLOAD_SIZE as usize];
        let actual = self.fill(&mut payload)?;
        if actual < payload.len() {
            return Err(DecodeError::TruncatedPayload {
                record,
                offset,
                expected: length,
                actual,
            });
        }

        let decoded = Record::from_payload(&payload)?;
        trace!(
            record,
            offset,
            key = decoded.key,
            value = decoded.value,
            "decoded record"
        );
        self.record += 1;
        Ok(Some(decoded))
    }

    /// Read until `buf` is full or the stream ends, returning bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize, DecodeError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(DecodeError::Io {
                        record: self.record,
                        offset: self.offset + filled as u64,
                        source,
                    });
                }
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }
}

impl<R: Read> Iterator for RecordDecoder<R> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for RecordDecoder<R> {}

/// Values decoded from the output stream, grouped by key in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedResults {
    values: BTreeMap<u32, Vec<u32>>,
    record_count: u64,
}

impl ReceivedResults {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a whole stream.
    ///
    /// # Errors
    ///
    /// Returns the first `DecodeError` hit; no partial result is returned.
    pub fn decode<R: Read>(reader: R) -> Result<Self, DecodeError> {
        let mut results = Self::new();
        for record in RecordDecoder::new(reader) {
            results.push(record?);
        }
        debug!(
            "Decoded {} records across {} keys",
            results.record_count,
            results.len()
        );
        Ok(results)
    }

    /// Decode an output file.
    pub fn from_file(path: &Path) -> Result<Self, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Decoding output from {}", path.display());
        Self::decode(BufReader::new(file))
    }

    /// Append a record's value to its key's sequence
    pub fn push(&mut self, record: Record) {
        self.values.entry(record.key).or_default().push(record.value);
        self.record_count += 1;
    }

    /// Received sequence for a key
    pub fn get(&self, key: u32) -> Option<&[u32]> {
        self.values.get(&key).map(Vec::as_slice)
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.values.keys().copied()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no records were decoded
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Total number of records pushed
    pub const fn record_count(&self) -> u64 {
        self.record_count
    }
}

impl FromIterator<Record> for ReceivedResults {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut results = Self::new();
        results.extend(iter);
        results
    }
}

impl Extend<Record> for ReceivedResults {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.push(record);
        }
    }
}
