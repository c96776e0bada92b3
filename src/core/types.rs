use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Placeholder written for a column with no hits
pub const MISSING_VALUE: &str = "-";

/// Separator between multiple labels in one column
pub const VALUE_SEPARATOR: &str = ";";

/// Hits for one assembly as returned by the hit finder: column -> labels
pub type HitRecord = BTreeMap<String, BTreeSet<String>>;

/// Alignment thresholds for primary and spurious hits, all in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmrThresholds {
    pub min_identity: f64,
    pub min_coverage: f64,
    pub min_spurious_identity: f64,
    pub min_spurious_coverage: f64,
}

impl AmrThresholds {
    pub const DEFAULT_MIN_IDENTITY: f64 = 90.0;
    pub const DEFAULT_MIN_COVERAGE: f64 = 80.0;
    pub const DEFAULT_MIN_SPURIOUS_IDENTITY: f64 = 80.0;
    pub const DEFAULT_MIN_SPURIOUS_COVERAGE: f64 = 40.0;
}

impl Default for AmrThresholds {
    fn default() -> Self {
        Self {
            min_identity: Self::DEFAULT_MIN_IDENTITY,
            min_coverage: Self::DEFAULT_MIN_COVERAGE,
            min_spurious_identity: Self::DEFAULT_MIN_SPURIOUS_IDENTITY,
            min_spurious_coverage: Self::DEFAULT_MIN_SPURIOUS_COVERAGE,
        }
    }
}

/// Output columns declared by a genotyping module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModuleHeaders {
    /// Every column written to the full output table
    pub full: Vec<String>,

    /// Condensed subset shown on the console (may be empty)
    pub stdout: Vec<String>,
}

/// One formatted output row, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    columns: Vec<(String, String)>,
}

impl ResultRow {
    /// Build a row with one entry per header.
    ///
    /// Labels are sorted and joined with `;`; headers without hits get `-`.
    /// Callers are expected to have checked that every hit key is a header.
    #[must_use]
    pub fn from_hits(headers: &[String], hits: &HitRecord) -> Self {
        let columns = headers
            .iter()
            .map(|header| {
                let value = match hits.get(header) {
                    Some(labels) => join_labels(labels),
                    None => MISSING_VALUE.to_string(),
                };
                (header.clone(), value)
            })
            .collect();
        Self { columns }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Columns that carry at least one hit
    pub fn populated(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(_, value)| *value != MISSING_VALUE)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// Serialized as a JSON object that keeps header order
impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Join labels in sorted order. An empty label set renders as `-`.
fn join_labels(labels: &BTreeSet<String>) -> String {
    if labels.is_empty() {
        return MISSING_VALUE.to_string();
    }
    labels
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(VALUE_SEPARATOR)
}
