use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::core::types::QualityEncoding;
use crate::parsing::fastq::ReaderOptions;
use crate::prep::grouper::{split_mate_lists, Libraries, LibraryGrouper};
use crate::prep::report::TracingReporter;

#[derive(Args)]
pub struct PrepArgs {
    /// Directory searched recursively for .fastq/.fq files (optionally gzipped)
    #[arg(required = true)]
    pub root: PathBuf,

    /// Quality scores use the Phred+64 offset instead of Phred+33
    #[arg(long)]
    pub phred64: bool,
}

/// Execute prep subcommand
///
/// # Errors
///
/// Returns an error if the directory cannot be searched or a read file
/// cannot be opened, parsed, or is empty.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PrepArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !args.root.is_dir() {
        anyhow::bail!("{} is not a directory", args.root.display());
    }

    let options = ReaderOptions {
        encoding: if args.phred64 {
            QualityEncoding::Phred64
        } else {
            QualityEncoding::Phred33
        },
    };
    let grouper = LibraryGrouper::new(options)?;
    let libraries = grouper
        .group_directory(&args.root, &mut TracingReporter)
        .with_context(|| format!("Failed to group reads below {}", args.root.display()))?;

    if libraries.is_empty() && verbose {
        eprintln!("No libraries found below {}", args.root.display());
    }

    match format {
        OutputFormat::Text => print_text(&libraries),
        OutputFormat::Json => {
            let records: Vec<_> = libraries.values().collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Tsv => print_tsv(&libraries),
    }

    Ok(())
}

fn print_text(libraries: &Libraries) {
    let (first_mates, rest) = split_mate_lists(libraries);
    println!("{first_mates:?}");
    println!("{rest:?}");
}

fn print_tsv(libraries: &Libraries) {
    println!("sample\tlibrary\ttechnology\tlength_class\tpaired\tread_count\tfile1\tfile2");
    for record in libraries.values() {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.sample,
            record.library,
            record.technology,
            record
                .length_class
                .map(|c| c.to_string())
                .unwrap_or_default(),
            record.paired,
            record.read_count,
            record.files.first().display(),
            record
                .files
                .second()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
    }
}
