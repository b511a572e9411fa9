use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod parsing;
mod prep;
mod summary;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Library counts are reported at info, per-library details at debug
    let filter = if cli.verbose {
        EnvFilter::new("readprep=debug,info")
    } else {
        EnvFilter::new("readprep=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Prep(args) => {
            cli::prep::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Summarize(args) => {
            cli::summarize::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
