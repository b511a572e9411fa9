//! # readprep
//!
//! Pipeline-support tooling for amplicon sequencing runs.
//!
//! Before alignment, raw FASTQ files arrive as a loose pile: different
//! instruments, different header conventions, mates in separate files.
//! `readprep` classifies each file from its first read header and folds
//! mate files into libraries. After the pipeline has run, it gathers the
//! per-sample variant calls and alignments into tables for review.
//!
//! ## Features
//!
//! - **Header classification**: Illumina (old and new), SRA (old and new) and
//!   PacBio read headers
//! - **Library grouping**: mate files paired by their filename-derived sample key
//! - **Read sampling**: average read length and mean quality from the leading reads
//! - **Variant summaries**: variants of interest, novel and intronic calls per sample
//! - **Coverage checks**: codon depth and per-gene median depth from BAM files
//!
//! ## Example
//!
//! ```rust,no_run
//! use readprep::{LibraryGrouper, ReaderOptions, TracingReporter};
//! use std::path::Path;
//!
//! let grouper = LibraryGrouper::new(ReaderOptions::default()).unwrap();
//! let libraries = grouper
//!     .group_directory(Path::new("fastq"), &mut TracingReporter)
//!     .unwrap();
//!
//! for record in libraries.values() {
//!     println!("{} {} paired={}", record.sample, record.technology, record.paired);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Read, library and platform types
//! - [`parsing`]: FASTQ, VCF, BED and variant-of-interest parsers
//! - [`prep`]: Header classification and library grouping
//! - [`summary`]: Variant tables, statistics and coverage
//! - [`cli`]: Command-line interface implementation

pub mod cli;
pub mod core;
pub mod parsing;
pub mod prep;
pub mod summary;
pub mod utils;

// Re-export commonly used types for convenience
pub use crate::core::library::{LibraryFiles, LibraryRecord};
pub use crate::core::record::SequenceRecord;
pub use crate::core::types::*;
pub use parsing::fastq::{FastqReader, ReaderOptions};
pub use prep::grouper::LibraryGrouper;
pub use prep::report::{GroupingReporter, TracingReporter};
pub use summary::{summarize, SummaryConfig};
