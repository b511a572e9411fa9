use std::path::Path;

use crate::parsing::fastq::{FastqReader, ReaderOptions};
use crate::prep::PrepError;
use crate::utils::math::count_to_f64;

/// Number of leading records sampled for read-length estimates
pub const SAMPLE_SIZE: usize = 100;

/// Summary of the leading reads of one file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadSample {
    pub reads: usize,
    pub avg_read_len: f64,
    /// Mean Phred score over every sampled base, `None` if no bases were seen
    pub mean_quality: Option<f64>,
}

/// Sample up to [`SAMPLE_SIZE`] records from the start of a file.
///
/// # Errors
///
/// Returns `PrepError::EmptyFile` if the file holds no records, or a parse
/// error if it cannot be read.
pub fn sample_reads(path: &Path, options: ReaderOptions) -> Result<ReadSample, PrepError> {
    let reader = FastqReader::open(path)?;

    let mut reads = 0usize;
    let mut total_length = 0usize;
    let mut quality_sum = 0u64;
    let mut quality_bases = 0usize;

    for record in reader.take(SAMPLE_SIZE) {
        let record = record?;
        reads += 1;
        total_length += record.len();
        for score in record.phred_scores(options.encoding) {
            quality_sum += u64::from(score);
            quality_bases += 1;
        }
    }

    if reads == 0 {
        return Err(PrepError::EmptyFile(path.to_path_buf()));
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_quality = (quality_bases > 0).then(|| quality_sum as f64 / count_to_f64(quality_bases));

    Ok(ReadSample {
        reads,
        avg_read_len: count_to_f64(total_length) / count_to_f64(reads),
        mean_quality,
    })
}

/// Average sequence length over the first [`SAMPLE_SIZE`] records.
///
/// # Errors
///
/// Returns `PrepError::EmptyFile` if the file holds no records.
pub fn avg_read_len(path: &Path) -> Result<f64, PrepError> {
    sample_reads(path, ReaderOptions::default()).map(|s| s.avg_read_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn fastq_with_lengths(lengths: &[usize]) -> String {
        let mut text = String::new();
        for (i, len) in lengths.iter().enumerate() {
            let _ = write!(
                text,
                "@read{i}\n{}\n+\n{}\n",
                "A".repeat(*len),
                "I".repeat(*len)
            );
        }
        text
    }

    #[test]
    fn test_avg_read_len() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fastq");
        std::fs::write(&path, fastq_with_lengths(&[10, 20, 30])).unwrap();

        assert_eq!(avg_read_len(&path).unwrap(), 20.0);
    }

    #[test]
    fn test_only_first_hundred_records_sampled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fastq");
        let mut lengths = vec![10; SAMPLE_SIZE];
        lengths.push(1000);
        std::fs::write(&path, fastq_with_lengths(&lengths)).unwrap();

        let sample = sample_reads(&path, ReaderOptions::default()).unwrap();
        assert_eq!(sample.reads, SAMPLE_SIZE);
        assert_eq!(sample.avg_read_len, 10.0);
    }

    #[test]
    fn test_mean_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.fastq");
        // 'I' is Q40 and '+' is Q10 under Phred+33
        std::fs::write(&path, "@r1\nACGT\n+\nII++\n").unwrap();

        let sample = sample_reads(&path, ReaderOptions::default()).unwrap();
        assert_eq!(sample.mean_quality, Some(25.0));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fastq");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(avg_read_len(&path), Err(PrepError::EmptyFile(_))));
    }
}
