use clap::Args;

use crate::cli::{DataDirArgs, OutputFormat};
use crate::genotype::amr::{AmrConfig, KpscAmrModule};
use crate::genotype::hits::CommandHitFinder;
use crate::genotype::pipeline::GenotypingModule;

#[derive(Args)]
pub struct HeadersArgs {
    #[command(flatten)]
    pub data: DataDirArgs,
}

/// Execute headers subcommand
///
/// # Errors
///
/// Returns an error if the class table cannot be loaded.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: HeadersArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let module = KpscAmrModule::new(
        AmrConfig::new(args.data.data_dir()),
        Box::new(CommandHitFinder::default()),
    );
    let headers = module.headers()?;

    if verbose {
        eprintln!(
            "{}: {} full columns, {} console columns",
            module.name(),
            headers.full.len(),
            headers.stdout.len()
        );
    }

    match format {
        OutputFormat::Text => {
            for column in &headers.full {
                println!("{column}");
            }
        }
        OutputFormat::Tsv => println!("{}", headers.full.join("\t")),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "module": module.name(),
                "description": module.description(),
                "full": headers.full,
                "stdout": headers.stdout,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
