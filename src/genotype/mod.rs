//! Genotyping modules and the pipeline that drives them.
//!
//! - [`KpscAmrModule`]: acquired-resistance genotyping for the *K. pneumoniae* species complex
//! - [`HitFinder`]: seam to the external alignment/hit-reconciliation step
//! - [`Pipeline`]: host-side control flow (validate, preflight, headers, results)
//!
//! ## Example
//!
//! ```rust,no_run
//! use kpsc_amr::catalog::data_dir::DataDir;
//! use kpsc_amr::genotype::amr::{AmrConfig, KpscAmrModule};
//! use kpsc_amr::genotype::hits::CommandHitFinder;
//! use kpsc_amr::genotype::pipeline::{AssemblyInput, Pipeline};
//!
//! let config = AmrConfig::new(DataDir::new("data"));
//! let module = KpscAmrModule::new(config, Box::new(CommandHitFinder::default()));
//! let pipeline = Pipeline::new(vec![Box::new(module)]);
//!
//! let results = pipeline.run(&[AssemblyInput::new("sample.fasta")], None).unwrap();
//! for (column, value) in results[0].rows[0].1.populated() {
//!     println!("{column}\t{value}");
//! }
//! ```

use thiserror::Error;

use crate::catalog::classes::ClassTableError;
use crate::catalog::data_dir::DataDirError;
use crate::utils::validation::ValidationError;

pub mod amr;
pub mod hits;
pub mod pipeline;

pub use amr::KpscAmrModule;
pub use hits::{CommandHitFinder, HitFinder, HitRequest};
pub use pipeline::{AssemblyInput, GenotypingModule, Pipeline};

#[derive(Error, Debug)]
pub enum GenotypeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Classes(#[from] ClassTableError),

    #[error(transparent)]
    Data(#[from] DataDirError),

    #[error(transparent)]
    HitFinder(#[from] hits::HitFinderError),

    #[error("results contained a value ({0}) that is not covered by the output headers")]
    UnexpectedColumn(String),

    #[error("module {module} requires module {prerequisite}, which is not in the pipeline")]
    MissingPrerequisite {
        module: String,
        prerequisite: String,
    },

    #[error("no assemblies given")]
    NoAssemblies,
}
