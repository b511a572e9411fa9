//! Grouping raw read files into sequencing libraries.
//!
//! The prep pass walks a directory for FASTQ files and, for each one:
//!
//! 1. Classifies the first read header ([`classifier`])
//! 2. Samples the leading reads for length and quality ([`metrics`])
//! 3. Derives a sample key from the file name ([`sample`])
//! 4. Folds files sharing a key into one library ([`grouper`])
//!
//! Progress and problems are surfaced through a [`report::GroupingReporter`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use readprep::parsing::fastq::ReaderOptions;
//! use readprep::prep::grouper::LibraryGrouper;
//! use readprep::prep::report::TracingReporter;
//! use std::path::Path;
//!
//! let grouper = LibraryGrouper::new(ReaderOptions::default()).unwrap();
//! let libraries = grouper
//!     .group_directory(Path::new("runs/2024-01"), &mut TracingReporter)
//!     .unwrap();
//!
//! for (sample, library) in &libraries {
//!     println!("{sample}: {} file(s), paired={}", library.files.len(), library.paired);
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::parsing::fastq::ParseError;

pub mod classifier;
pub mod discover;
pub mod grouper;
pub mod metrics;
pub mod report;
pub mod sample;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("No reads found in {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to walk input directory: {0}")]
    Walk(#[from] glob::GlobError),

    #[error("Invalid built-in pattern: {0}")]
    Regex(#[from] regex::Error),
}
