use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod matching;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("roll_dedup=debug,info")
    } else {
        EnvFilter::new("roll_dedup=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        cli::Commands::Compare(args) => {
            cli::compare::run(args, config, cli.format, cli.verbose)?;
        }
        cli::Commands::Scan(args) => {
            cli::scan::run(args, config, cli.format, cli.verbose)?;
        }
        cli::Commands::Similarity(args) => {
            cli::similarity::run(&args, cli.format)?;
        }
    }

    Ok(())
}
