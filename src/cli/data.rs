use clap::Args;

use crate::catalog::classes::ClassTable;
use crate::catalog::data_dir::count_fasta_records;
use crate::cli::{DataDirArgs, OutputFormat};

#[derive(Args)]
pub struct DataArgs {
    #[command(flatten)]
    pub data: DataDirArgs,
}

/// Execute data subcommand
///
/// # Errors
///
/// Returns an error if any reference file is missing or unreadable.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: DataArgs, format: OutputFormat) -> anyhow::Result<()> {
    let data_dir = args.data.data_dir();
    let files = data_dir.resolve()?;
    let classes = ClassTable::load(&files.classes)?;
    let labels = classes.labels_by_column();

    let mut fasta_counts = Vec::new();
    for (label, path) in files.fasta_files() {
        fasta_counts.push((label, path, count_fasta_records(path)?));
    }

    match format {
        OutputFormat::Text => {
            println!("Data directory: {}", data_dir.root().display());
            println!(
                "  {}: {} genes, {} resistance classes, {} beta-lactamase classes",
                files.classes.display(),
                classes.len(),
                classes.res_classes.len(),
                classes.bla_classes.len()
            );
            for (column, genes) in &labels {
                println!("    {column}: {} genes", genes.len());
            }
            for (label, path, count) in &fasta_counts {
                println!("  {label}: {} ({count} sequences)", path.display());
            }
        }
        OutputFormat::Tsv => {
            println!("file\tpath\trecords");
            println!("classes\t{}\t{}", files.classes.display(), classes.len());
            for (column, genes) in &labels {
                println!("column:{column}\t{}\t{}", files.classes.display(), genes.len());
            }
            for (label, path, count) in &fasta_counts {
                println!("{label}\t{}\t{count}", path.display());
            }
        }
        OutputFormat::Json => {
            let references: serde_json::Map<String, serde_json::Value> = fasta_counts
                .iter()
                .map(|(label, path, count)| {
                    (
                        (*label).to_string(),
                        serde_json::json!({
                            "path": path.display().to_string(),
                            "sequences": count,
                        }),
                    )
                })
                .collect();
            let output = serde_json::json!({
                "data_dir": data_dir.root().display().to_string(),
                "classes": {
                    "path": files.classes.display().to_string(),
                    "genes": classes.len(),
                    "res_classes": classes.res_classes,
                    "bla_classes": classes.bla_classes,
                    "columns": labels,
                },
                "references": references,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
