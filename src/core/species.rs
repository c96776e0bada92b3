//! Species-complex membership tests.
//!
//! Each test is a prefix match of the species call against a fixed list, so
//! subspecies and free-text suffixes ("Klebsiella pneumoniae subsp. X") still
//! match their parent species.

use serde::Serialize;

/// Species in the *Klebsiella pneumoniae* species complex
pub const KP_COMPLEX: &[&str] = &[
    "Klebsiella pneumoniae",
    "Klebsiella quasipneumoniae",
    "Klebsiella variicola",
    "Klebsiella quasivariicola",
    "Klebsiella africana",
];

/// Species in the *Klebsiella oxytoca* species complex
pub const KO_COMPLEX: &[&str] = &[
    "Klebsiella oxytoca",
    "Klebsiella grimontii",
    "Klebsiella michiganensis",
    "Klebsiella pasteurii",
];

pub const ESCHERICHIA: &[&str] = &["Escherichia"];

/// A species call for one assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesCall {
    pub species: String,
}

impl SpeciesCall {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
        }
    }
}

fn starts_with_any(species: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| species.starts_with(prefix))
}

/// True if the species call is in the Kp-complex
#[must_use]
pub fn is_kp_complex(call: &SpeciesCall) -> bool {
    starts_with_any(&call.species, KP_COMPLEX)
}

/// True if the species call is in the Ko-complex
#[must_use]
pub fn is_ko_complex(call: &SpeciesCall) -> bool {
    starts_with_any(&call.species, KO_COMPLEX)
}

/// True if the species call is in the *Escherichia* genus
#[must_use]
pub fn is_escherichia(call: &SpeciesCall) -> bool {
    starts_with_any(&call.species, ESCHERICHIA)
}

/// Reporting group a species call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesGroup {
    KpComplex,
    KoComplex,
    Escherichia,
    Other,
}

impl SpeciesGroup {
    #[must_use]
    pub fn of(call: &SpeciesCall) -> Self {
        if is_kp_complex(call) {
            Self::KpComplex
        } else if is_ko_complex(call) {
            Self::KoComplex
        } else if is_escherichia(call) {
            Self::Escherichia
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for SpeciesGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KpComplex => write!(f, "Kp-complex"),
            Self::KoComplex => write!(f, "Ko-complex"),
            Self::Escherichia => write!(f, "Escherichia"),
            Self::Other => write!(f, "other"),
        }
    }
}
