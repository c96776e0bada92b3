use clap::Args;

use crate::cli::OutputFormat;
use crate::core::species::{is_escherichia, is_ko_complex, is_kp_complex, SpeciesCall, SpeciesGroup};

#[derive(Args)]
pub struct SpeciesArgs {
    /// Species names, e.g. "Klebsiella pneumoniae"
    #[arg(required = true)]
    pub names: Vec<String>,
}

#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: SpeciesArgs, format: OutputFormat) -> anyhow::Result<()> {
    let calls: Vec<SpeciesCall> = args.names.iter().map(SpeciesCall::new).collect();

    match format {
        OutputFormat::Text => {
            for call in &calls {
                println!("{}\t{}", call.species, SpeciesGroup::of(call));
            }
        }
        OutputFormat::Tsv => {
            println!("species\tgroup\tkp_complex\tko_complex\tescherichia");
            for call in &calls {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    call.species,
                    SpeciesGroup::of(call),
                    is_kp_complex(call),
                    is_ko_complex(call),
                    is_escherichia(call),
                );
            }
        }
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = calls
                .iter()
                .map(|call| {
                    serde_json::json!({
                        "species": call.species,
                        "group": SpeciesGroup::of(call),
                        "kp_complex": is_kp_complex(call),
                        "ko_complex": is_ko_complex(call),
                        "escherichia": is_escherichia(call),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
