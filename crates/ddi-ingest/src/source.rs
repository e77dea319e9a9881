//! Header-driven CSV row source
//!
//! Columns are located by header name, so files may order them freely or
//! carry extra columns. Rows are decoded one at a time; the file is never
//! loaded whole.

use crate::IngestError;
use csv::{ByteRecord, Reader, ReaderBuilder, StringRecord};
use ddi_domain::InteractionRecord;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

const BOM: char = '\u{feff}';

/// One decoded data row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// A valid record
    Record(InteractionRecord),
    /// A row that cannot become a record
    Rejected {
        /// 1-based file line the row starts on (the header is line 1)
        line: u64,
        /// Why the row was rejected
        reason: String,
    },
}

/// Streaming reader over one CSV file
pub struct CsvSource {
    path: PathBuf,
    reader: Reader<BufReader<File>>,
    headers: Vec<String>,
}

impl CsvSource {
    /// Open `path` and read its header row
    ///
    /// A missing file surfaces as [`io::ErrorKind::NotFound`] so callers can
    /// tell it apart from other failures.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let headers = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| (if i == 0 { h.trim_start_matches(BOM) } else { h }).to_string())
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            headers,
        })
    }

    /// Column names from the header row
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn decode(&self, raw: ByteRecord) -> RowOutcome {
        // Quoted fields may span lines, so the reader's position is the
        // only reliable line number.
        let line = raw.position().map_or(0, |p| p.line());
        let row = match StringRecord::from_byte_record(raw) {
            Ok(row) => row,
            Err(e) => {
                return RowOutcome::Rejected {
                    line,
                    reason: format!("invalid UTF-8: {}", e.utf8_error()),
                }
            }
        };

        let lookup = |column: &str| {
            self.headers
                .iter()
                .position(|h| h == column)
                .and_then(|i| row.get(i))
        };

        match InteractionRecord::from_row(lookup) {
            Ok(record) => RowOutcome::Record(record),
            Err(e) => RowOutcome::Rejected {
                line,
                reason: e.to_string(),
            },
        }
    }
}

impl Iterator for CsvSource {
    type Item = Result<RowOutcome, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut raw = ByteRecord::new();
        match self.reader.read_byte_record(&mut raw) {
            Ok(false) => None,
            Ok(true) => Some(Ok(self.decode(raw))),
            Err(e) => Some(Err(IngestError::Source {
                path: self.path.clone(),
                message: e.to_string(),
            })),
        }
    }
}
