//! Core data types for resistance genotyping.
//!
//! - [`AmrThresholds`]: identity/coverage thresholds for primary and spurious hits
//! - [`HitRecord`]: column -> labels mapping produced by the hit finder
//! - [`ResultRow`]: one formatted output row, in header order
//! - [`ModuleHeaders`]: the full and console column lists of a module
//! - [`SpeciesCall`]: a species call, with the complex-membership tests in [`species`]
//!
//! [`AmrThresholds`]: types::AmrThresholds
//! [`HitRecord`]: types::HitRecord
//! [`ResultRow`]: types::ResultRow
//! [`ModuleHeaders`]: types::ModuleHeaders
//! [`SpeciesCall`]: species::SpeciesCall

pub mod species;
pub mod types;
