use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod genotype;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("kpsc_amr=debug,info")
    } else {
        EnvFilter::new("kpsc_amr=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Genotype(args) => {
            cli::genotype::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Headers(args) => {
            cli::headers::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Species(args) => {
            cli::species::run(args, cli.format)?;
        }
        cli::Commands::Data(args) => {
            cli::data::run(args, cli.format)?;
        }
    }

    Ok(())
}
