use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::summary::{summarize, write_tables, Summary, SummaryConfig, DEFAULT_MIN_DEPTH};

#[derive(Args)]
pub struct SummarizeArgs {
    /// BED file of amplicon target regions
    #[arg(long, required = true)]
    pub bed: PathBuf,

    /// Variants-of-interest table with Gene and SNP columns (.tsv or .csv)
    #[arg(long, required = true)]
    pub voi: PathBuf,

    /// Pipeline output directory holding one subdirectory per sample
    #[arg(long, required = true)]
    pub out: PathBuf,

    /// Directory for the summary tables (defaults to --out)
    #[arg(long)]
    pub tables: Option<PathBuf>,

    /// Median depth a gene needs to pass
    #[arg(long, default_value_t = DEFAULT_MIN_DEPTH)]
    pub min_depth: f64,
}

/// Execute summarize subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be parsed or a table cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SummarizeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !args.out.is_dir() {
        anyhow::bail!("{} is not a directory", args.out.display());
    }

    let config = SummaryConfig {
        min_depth: args.min_depth,
        ..SummaryConfig::new(&args.bed, &args.voi, &args.out)
    };
    let summary = summarize(&config)
        .with_context(|| format!("Failed to summarize {}", args.out.display()))?;

    let tables = args.tables.as_deref().unwrap_or(&args.out);
    let written = write_tables(&summary, tables)
        .with_context(|| format!("Failed to write tables to {}", tables.display()))?;

    if verbose {
        for path in &written {
            eprintln!("Wrote {}", path.display());
        }
    }

    match format {
        OutputFormat::Text => print_text(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary.depth_pass)?),
        OutputFormat::Tsv => print_tsv(&summary),
    }

    Ok(())
}

fn print_text(summary: &Summary) {
    for (sample, genes) in &summary.depth_pass {
        let genes: Vec<String> = genes
            .iter()
            .map(|(gene, passed)| format!("{gene}: {passed}"))
            .collect();
        println!("{sample} {{{}}}", genes.join(", "));
    }
}

fn print_tsv(summary: &Summary) {
    println!("sample\tgene\tpass");
    for (sample, genes) in &summary.depth_pass {
        for (gene, passed) in genes {
            println!("{sample}\t{gene}\t{passed}");
        }
    }
}
