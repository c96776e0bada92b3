use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use crate::cli::{DataDirArgs, OutputFormat, ThresholdArgs};
use crate::core::species::SpeciesCall;
use crate::genotype::amr::{AmrConfig, KpscAmrModule, DEFAULT_ALIGNER};
use crate::genotype::hits::CommandHitFinder;
use crate::genotype::pipeline::{AssemblyInput, AssemblyResult, Pipeline};

#[derive(Args)]
pub struct GenotypeArgs {
    /// Assemblies to genotype (FASTA, optionally gzipped)
    #[arg(required = true)]
    pub assemblies: Vec<PathBuf>,

    #[command(flatten)]
    pub data: DataDirArgs,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// Program that aligns an assembly and prints its hits as JSON
    #[arg(long, default_value = CommandHitFinder::DEFAULT_PROGRAM)]
    pub hit_finder: String,

    /// Aligner required by the hit finder
    #[arg(long, default_value = DEFAULT_ALIGNER)]
    pub aligner: String,

    /// Species call applied to every assembly
    #[arg(long)]
    pub species: Option<String>,

    /// Number of assemblies to genotype in parallel (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Write the full results table (TSV) to this file
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

/// Execute genotype subcommand
///
/// # Errors
///
/// Returns an error if validation, preflight or genotyping of any assembly fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: GenotypeArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = AmrConfig::new(args.data.data_dir())
        .with_thresholds(args.thresholds.thresholds())
        .with_aligner(&args.aligner);
    let module = KpscAmrModule::new(config, Box::new(CommandHitFinder::new(&args.hit_finder)));
    let pipeline = Pipeline::new(vec![Box::new(module)]);

    let assemblies: Vec<AssemblyInput> = args.assemblies.iter().map(AssemblyInput::new).collect();
    let species = args.species.as_deref().map(SpeciesCall::new);

    if verbose {
        eprintln!(
            "Genotyping {} assemblies with {}",
            assemblies.len(),
            pipeline.module_names().join(", ")
        );
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.unwrap_or(0))
        .build()
        .context("Failed to build thread pool")?;
    let results = pool.install(|| pipeline.run(&assemblies, species.as_ref()))?;
    let headers = pipeline.headers()?;

    if let Some(path) = &args.outfile {
        write_tsv_file(path, &headers, &results)?;
        info!("Wrote {} rows to {}", results.len(), path.display());
    }

    match format {
        OutputFormat::Text => print_text_results(&results),
        OutputFormat::Json => print_json_results(&pipeline.module_names(), &results)?,
        OutputFormat::Tsv => {
            let stdout = std::io::stdout();
            write_tsv(&mut stdout.lock(), &headers, &results)?;
        }
    }

    Ok(())
}

fn write_tsv_file(path: &Path, headers: &[String], results: &[AssemblyResult]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    write_tsv(&mut writer, headers, results)?;
    writer.flush()?;
    Ok(())
}

fn write_tsv<W: Write>(
    writer: &mut W,
    headers: &[String],
    results: &[AssemblyResult],
) -> std::io::Result<()> {
    writeln!(writer, "strain\t{}", headers.join("\t"))?;
    for result in results {
        let values: Vec<&str> = result.values().collect();
        writeln!(writer, "{}\t{}", result.assembly, values.join("\t"))?;
    }
    Ok(())
}

fn print_text_results(results: &[AssemblyResult]) {
    for result in results {
        println!("{}", result.assembly);
        let mut any = false;
        for (_, row) in &result.rows {
            for (column, value) in row.populated() {
                println!("  {column}: {value}");
                any = true;
            }
        }
        if !any {
            println!("  no resistance hits");
        }
    }
}

fn print_json_results(modules: &[&str], results: &[AssemblyResult]) -> anyhow::Result<()> {
    let output = json_results(modules, results, &chrono::Utc::now().to_rfc3339())?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// `{module, generated_at, results: [{assembly, species, row}]}`, where `row`
/// holds the columns of every module
fn json_results(
    modules: &[&str],
    results: &[AssemblyResult],
    generated_at: &str,
) -> serde_json::Result<serde_json::Value> {
    let entries: Vec<serde_json::Value> = results
        .iter()
        .map(|result| {
            let mut row = serde_json::Map::new();
            for (_, module_row) in &result.rows {
                for (column, value) in module_row.iter() {
                    row.insert(column.to_string(), serde_json::Value::from(value));
                }
            }
            serde_json::json!({
                "assembly": result.assembly,
                "species": result.species,
                "row": row,
            })
        })
        .collect();

    Ok(serde_json::json!({
        "module": modules.join(","),
        "generated_at": generated_at,
        "results": entries,
    }))
}
