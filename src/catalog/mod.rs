//! Reference data used by the resistance genotyping module.
//!
//! - [`classes`]: the gene-classification table and the class lists derived from it
//! - [`data_dir`]: the injected data directory and its reference files

pub mod classes;
pub mod data_dir;
