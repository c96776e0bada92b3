//! # kpsc-amr
//!
//! Acquired-resistance genotyping for *Klebsiella pneumoniae* species complex
//! (KpSC) assemblies.
//!
//! An external hit finder aligns each assembly against a curated resistance
//! gene catalog and a handful of marker references (QRDR, truncation markers,
//! outer-membrane proteins) and reports hits grouped by resistance class.
//! `kpsc-amr` is the layer around it:
//!
//! - **Threshold validation**: identity/coverage thresholds must lie in fixed open intervals
//! - **Reference data**: an injected data directory holding the class table and FASTA references
//! - **Schema check**: every column the hit finder reports must be a known output column
//! - **Formatting**: one fixed-column row per assembly, sorted `;`-joined labels, `-` for no hit
//! - **Species helpers**: Kp-complex, Ko-complex and *Escherichia* membership tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use kpsc_amr::catalog::data_dir::DataDir;
//! use kpsc_amr::core::species::{is_kp_complex, SpeciesCall};
//! use kpsc_amr::genotype::{AssemblyInput, CommandHitFinder, GenotypingModule, KpscAmrModule};
//! use kpsc_amr::genotype::amr::AmrConfig;
//!
//! let module = KpscAmrModule::new(
//!     AmrConfig::new(DataDir::new("data")),
//!     Box::new(CommandHitFinder::default()),
//! );
//! module.check_options().unwrap();
//!
//! let species = SpeciesCall::new("Klebsiella pneumoniae");
//! assert!(is_kp_complex(&species));
//!
//! let row = module.results(&AssemblyInput::new("sample.fasta"), Some(&species)).unwrap();
//! println!("{:?}", row.get("Bla_acquired"));
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Gene class table and reference data directory
//! - [`core`]: Thresholds, hit records, result rows and species tests
//! - [`genotype`]: The KpSC AMR module, the hit-finder seam and the pipeline
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod genotype;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::classes::ClassTable;
pub use catalog::data_dir::DataDir;
pub use core::species::SpeciesCall;
pub use core::types::*;
pub use genotype::{GenotypeError, KpscAmrModule};
