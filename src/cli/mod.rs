//! Command-line interface for kpsc-amr.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **genotype**: Genotype acquired resistance in one or more assemblies
//! - **headers**: List the output columns derived from the data directory
//! - **species**: Classify species names into Kp-complex, Ko-complex or Escherichia
//! - **data**: Verify the reference data directory
//!
//! ## Usage
//!
//! ```text
//! # Genotype assemblies against the bundled data
//! kpsc-amr genotype --data-dir data sample1.fasta sample2.fasta
//!
//! # Full table to a file, JSON on stdout
//! kpsc-amr genotype -o results.tsv --format json --data-dir data *.fasta
//!
//! # Stricter identity threshold
//! kpsc-amr genotype --kpsc-amr-min-identity 95 --data-dir data sample.fasta
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::catalog::data_dir::DataDir;
use crate::core::types::AmrThresholds;

pub mod data;
pub mod genotype;
pub mod headers;
pub mod species;

#[derive(Parser)]
#[command(name = "kpsc-amr")]
#[command(version)]
#[command(about = "Resistance genotyping for the Klebsiella pneumoniae species complex")]
#[command(
    long_about = "kpsc-amr reports acquired resistance genes and resistance mutations in Klebsiella pneumoniae species complex assemblies.\n\nAlignment and hit reconciliation are delegated to an external hit finder; kpsc-amr validates thresholds and reference data, checks that every reported column is known, and writes one fixed-column row per assembly."
)]
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
    /// Genotype acquired resistance in assemblies
    Genotype(genotype::GenotypeArgs),

    /// List the output columns
    Headers(headers::HeadersArgs),

    /// Classify species names
    Species(species::SpeciesArgs),

    /// Verify the reference data directory
    Data(data::DataArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Location of the reference data
#[derive(clap::Args, Debug, Clone)]
pub struct DataDirArgs {
    /// Directory holding the class table and FASTA references
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
}

impl DataDirArgs {
    pub fn data_dir(&self) -> DataDir {
        DataDir::new(&self.data_dir)
    }
}

/// KpSC AMR thresholds, validated by the module rather than by clap
#[derive(clap::Args, Debug, Clone)]
#[command(next_help_heading = "klebsiella_pneumo_complex__amr module")]
pub struct ThresholdArgs {
    /// Minimum alignment percent identity for KpSC AMR results
    #[arg(long, default_value_t = AmrThresholds::DEFAULT_MIN_IDENTITY)]
    pub kpsc_amr_min_identity: f64,

    /// Minimum alignment percent coverage for KpSC AMR results
    #[arg(long, default_value_t = AmrThresholds::DEFAULT_MIN_COVERAGE)]
    pub kpsc_amr_min_coverage: f64,

    /// Minimum alignment percent identity for KpSC AMR spurious results
    #[arg(long, default_value_t = AmrThresholds::DEFAULT_MIN_SPURIOUS_IDENTITY)]
    pub kpsc_amr_min_spurious_identity: f64,

    /// Minimum alignment percent coverage for KpSC AMR spurious results
    #[arg(long, default_value_t = AmrThresholds::DEFAULT_MIN_SPURIOUS_COVERAGE)]
    pub kpsc_amr_min_spurious_coverage: f64,
}

impl ThresholdArgs {
    pub fn thresholds(&self) -> AmrThresholds {
        AmrThresholds {
            min_identity: self.kpsc_amr_min_identity,
            min_coverage: self.kpsc_amr_min_coverage,
            min_spurious_identity: self.kpsc_amr_min_spurious_identity,
            min_spurious_coverage: self.kpsc_amr_min_spurious_coverage,
        }
    }
}
