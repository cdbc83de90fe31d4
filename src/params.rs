//! The delimited-text params reader.
//!
//! The original implementation's own comments describe its record reader as
//! "C bindings for Burntsushi's csv parser" — this adapter is the direct,
//! idiomatic equivalent: a thin wrapper around the `csv` crate rather than a
//! hand-rolled parser. Records have no header row and each row must yield
//! exactly three fields, in order: `host`, `start_ts`, `end_ts`.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// One line of query parameters, with fields copied out of the reader's
/// internal buffer so a `Record` remains valid after the next row is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub host: String,
    pub start_ts: String,
    pub end_ts: String,
}

const EXPECTED_FIELDS: usize = 3;

/// Reads params from a path, or from standard input when no path is given.
pub struct ParamsReader {
    inner: csv::Reader<Box<dyn Read>>,
}

impl ParamsReader {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(Box::new(file)))
    }

    pub fn from_stdin() -> Self {
        Self::from_reader(Box::new(io::stdin()))
    }

    fn from_reader(reader: Box<dyn Read>) -> Self {
        let inner = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self { inner }
    }

    /// Consumes the reader, yielding an iterator over parsed records.
    pub fn into_records(self) -> RecordsIter {
        RecordsIter { inner: self.inner.into_records(), index: 0 }
    }

    #[cfg(test)]
    pub(crate) fn from_str_for_tests(text: &str) -> Self {
        Self::from_reader(Box::new(io::Cursor::new(text.as_bytes().to_vec())))
    }
}

/// Yields one `Record` per input line; a malformed row (field count != 3) or
/// an underlying I/O error is reported with the 1-based index of the record
/// that failed, matching the core's "fatal, with record index" diagnostic
/// policy for iterator errors.
pub struct RecordsIter {
    inner: csv::StringRecordsIntoIter<Box<dyn Read>>,
    index: u64,
}

impl Iterator for RecordsIter {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.inner.next()?;
        self.index += 1;
        let index = self.index;

        let row = match row {
            Ok(row) => row,
            Err(source) => return Some(Err(Error::Iterator { record_index: index, source })),
        };

        if row.len() != EXPECTED_FIELDS {
            let source = csv::Error::from(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("expected {EXPECTED_FIELDS} fields, got {}", row.len()),
            ));
            return Some(Err(Error::Iterator { record_index: index, source }));
        }

        Some(Ok(Record {
            host: row[0].to_string(),
            start_ts: row[1].to_string(),
            end_ts: row[2].to_string(),
        }))
    }
}
