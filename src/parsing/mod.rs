//! Parsers for the files the prep and summarize passes read.
//!
//! - **FASTQ**: raw reads, plain or gzip-compressed, via noodles
//! - **VCF**: annotated amplicon variant calls with codon-level INFO fields
//! - **BED**: target regions used to lay out codons and measure coverage
//! - **Variant-of-interest tables**: TSV/CSV with `Gene` and `SNP` columns
//!
//! ## Example
//!
//! ```rust,no_run
//! use readprep::parsing::fastq::FastqReader;
//! use std::path::Path;
//!
//! let reader = FastqReader::open(Path::new("sample1_R1.fastq.gz")).unwrap();
//! for record in reader.take(5) {
//!     let record = record.unwrap();
//!     println!("{} ({} bp)", record.header, record.len());
//! }
//! ```
//!
//! ## Annotated VCF INFO keys
//!
//! | Key | Description |
//! |-----|-------------|
//! | DP  | Read depth at the site |
//! | AlFreq | Alternate allele fraction |
//! | Found | Number of callers reporting the site |
//! | ExonNumber | Exon index or `Intron` |
//! | CodonPos | Codon number within the gene |
//! | RefCodon / AltCodon | Reference and alternate codon |
//! | RefAA / AltAA | Reference and alternate amino acid |

pub mod bed;
pub mod fastq;
pub mod vcf;
pub mod voi;
