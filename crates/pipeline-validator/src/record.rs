//! Length-prefixed record wire format.
//!
//! Each record on the wire is a big-endian `u32` payload length followed by the
//! payload itself. The only payload this format carries is a key/value pair of
//! two big-endian `u32`s, so every well-formed record is 12 bytes:
//!
//! ```text
//! +----------------+----------------+----------------+
//! | length (u32 BE)| key (u32 BE)   | value (u32 BE) |
//! +----------------+----------------+----------------+
//! ```

use binrw::io::NoSeek;
use binrw::{BinRead, BinResult, BinWrite};
use std::io::{Cursor, Write};

use crate::error::DecodeError;

/// Size of the length prefix in bytes
pub const HEADER_SIZE: usize = 4;

/// Size of a key/value payload in bytes
pub const PAYLOAD_SIZE: u32 = 8;

/// A decoded key/value record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BinRead, BinWrite)]
#[brw(big)]
pub struct Record {
    /// Logical key the value is grouped under
    pub key: u32,
    /// Value emitted for the key
    pub value: u32,
}

impl Record {
    /// Create a record
    pub const fn new(key: u32, value: u32) -> Self {
        Self { key, value }
    }

    /// Decode a payload that has already been read off the wire.
    ///
    /// The slice must hold exactly [`PAYLOAD_SIZE`] bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(payload);
        Ok(Self::read(&mut cursor)?)
    }

    /// Write the length prefix and payload to `writer`.
    ///
    /// The writer does not need to be seekable.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> BinResult<()> {
        let mut writer = NoSeek::new(writer);
        PAYLOAD_SIZE.write_be(&mut writer)?;
        self.write(&mut writer)
    }
}

impl From<(u32, u32)> for Record {
    fn from((key, value): (u32, u32)) -> Self {
        Self::new(key, value)
    }
}

/// Streams records to any writer in wire format.
#[derive(Debug)]
pub struct RecordWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// Wrap a writer
    pub const fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Append one record
    pub fn write_record(&mut self, record: &Record) -> BinResult<()> {
        record.write_to(&mut self.inner)?;
        self.written += 1;
        Ok(())
    }

    /// Append every record from an iterator
    pub fn write_all<'a, I>(&mut self, records: I) -> BinResult<()>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Number of records written so far
    pub const fn records_written(&self) -> u64 {
        self.written
    }

    /// Flush and return the underlying writer
    pub fn finish(mut self) -> std::io::Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Encode a slice of records into a wire-format buffer
pub fn encode_records(records: &[Record]) -> BinResult<Vec<u8>> {
    let capacity = records.len() * (HEADER_SIZE + PAYLOAD_SIZE as usize);
    let mut writer = RecordWriter::new(Vec::with_capacity(capacity));
    writer.write_all(records)?;
    Ok(writer.finish()?)
}
