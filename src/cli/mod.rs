//! Command-line interface for readprep.
//!
//! - **prep**: group raw FASTQ files below a directory into libraries
//! - **summarize**: tabulate variant calls and coverage from pipeline output
//!
//! ## Usage
//!
//! ```text
//! # Print R1 files, then everything else
//! readprep prep runs/2024-01
//!
//! # Library records as JSON
//! readprep prep runs/2024-01 --format json
//!
//! # Summary tables next to the pipeline output
//! readprep summarize --bed targets.bed --voi voi.tsv --out pipeline_out
//! ```

use clap::{Parser, Subcommand};

pub mod prep;
pub mod summarize;

#[derive(Parser)]
#[command(name = "readprep")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Group sequencing reads into libraries and summarize variant calls")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Group FASTQ files into single-end and paired libraries
    Prep(prep::PrepArgs),

    /// Summarize variant calls and alignment depth per sample
    Summarize(summarize::SummarizeArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
