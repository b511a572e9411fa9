//! FASTQ reader built on noodles.
//!
//! Records are handed out as [`SequenceRecord`] values with the full
//! definition line (`@name description`) reassembled as the header, since
//! platform detection needs both halves. Gzip input is detected from the
//! file's magic bytes.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use noodles::fastq;
use thiserror::Error;

use crate::core::record::SequenceRecord;
use crate::core::types::QualityEncoding;
use crate::utils::io::open_text;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),
}

/// Read decoding options
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    pub encoding: QualityEncoding,
}

/// A lazy, single-pass iterator over the records of one FASTQ file.
///
/// Reading the file again means opening a new reader on the same path.
pub struct FastqReader {
    path: PathBuf,
    inner: fastq::io::Reader<Box<dyn BufRead>>,
    buf: fastq::Record,
}

impl FastqReader {
    /// Open a plain or gzip-compressed FASTQ file.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let inner = fastq::io::Reader::new(open_text(path)?);
        Ok(Self {
            path: path.to_path_buf(),
            inner,
            buf: fastq::Record::default(),
        })
    }

    /// Read the next record, or `None` at end of file.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Noodles` if the record is malformed.
    pub fn next_record(&mut self) -> Result<Option<SequenceRecord>, ParseError> {
        let n = self.inner.read_record(&mut self.buf).map_err(|e| {
            ParseError::Noodles(format!(
                "Failed to parse FASTQ record in {}: {e}",
                self.path.display()
            ))
        })?;

        if n == 0 {
            return Ok(None);
        }

        Ok(Some(SequenceRecord::new(
            header_line(&self.buf),
            String::from_utf8_lossy(self.buf.sequence()),
            String::from_utf8_lossy(self.buf.quality_scores()),
        )))
    }
}

impl Iterator for FastqReader {
    type Item = Result<SequenceRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Rebuild the `@name description` definition line noodles splits apart
fn header_line(record: &fastq::Record) -> String {
    let name = String::from_utf8_lossy(record.name());
    let description = record.description();
    if description.is_empty() {
        format!("@{name}")
    } else {
        format!("@{name} {}", String::from_utf8_lossy(description))
    }
}

/// Read only the first record of a file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or
/// `ParseError::Noodles` if the first record is malformed.
pub fn first_record(path: &Path) -> Result<Option<SequenceRecord>, ParseError> {
    FastqReader::open(path)?.next_record()
}

/// Count every record in a file with a full scan.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or
/// `ParseError::Noodles` if any record is malformed.
pub fn count_records(path: &Path) -> Result<u64, ParseError> {
    let mut reader = FastqReader::open(path)?;
    let mut count = 0u64;
    while reader.next_record()?.is_some() {
        count += 1;
    }
    Ok(count)
}
