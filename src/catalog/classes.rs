use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClassTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Class table is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Line {line} has {found} fields, expected at least {expected}")]
    ShortRow {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Line {line} has no value in required column '{column}'")]
    MissingValue { column: &'static str, line: usize },

    #[error("Duplicate sequence id '{id}' on line {line}")]
    DuplicateId { id: String, line: usize },

    #[error("No genes found in class table")]
    Empty,
}

/// Annotation of one reference sequence in the class table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneInfo {
    pub seq_id: String,
    pub gene: Option<String>,
    pub allele: Option<String>,
    pub allele_symbol: Option<String>,
    pub res_class: String,
    pub bla_class: Option<String>,
}

impl GeneInfo {
    /// Output column a hit on this gene is reported under
    pub fn column(&self) -> &str {
        self.bla_class.as_deref().unwrap_or(&self.res_class)
    }

    /// Label used for this gene in output rows
    pub fn label(&self) -> &str {
        self.allele_symbol
            .as_deref()
            .or(self.allele.as_deref())
            .or(self.gene.as_deref())
            .unwrap_or(&self.seq_id)
    }
}

/// Gene-classification table: sequence id -> resistance/drug class
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    genes: HashMap<String, GeneInfo>,

    /// Sorted classes of genes without a beta-lactamase class
    pub res_classes: Vec<String>,

    /// Sorted beta-lactamase classes
    pub bla_classes: Vec<String>,
}

/// Column indexes resolved from the header line
struct Columns {
    seq_id: usize,
    res_class: usize,
    bla_class: Option<usize>,
    gene: Option<usize>,
    allele: Option<usize>,
    allele_symbol: Option<usize>,
}

impl Columns {
    fn from_header(fields: &[&str]) -> Result<Self, ClassTableError> {
        let find = |name: &str| fields.iter().position(|f| f.trim().eq_ignore_ascii_case(name));
        Ok(Self {
            seq_id: find("seqID").ok_or(ClassTableError::MissingColumn("seqID"))?,
            res_class: find("class").ok_or(ClassTableError::MissingColumn("class"))?,
            bla_class: find("bla_class"),
            gene: find("gene"),
            allele: find("allele"),
            allele_symbol: find("allele_symbol"),
        })
    }

    fn required_len(&self) -> usize {
        self.seq_id
            .max(self.res_class)
            .max(self.bla_class.unwrap_or(0))
            + 1
    }
}

/// `NA`, `-` and empty cells are absent values
fn cell(fields: &[&str], index: Option<usize>) -> Option<String> {
    let value = fields.get(index?)?.trim();
    if value.is_empty() || value == "NA" || value == "-" {
        None
    } else {
        Some(value.to_string())
    }
}

impl ClassTable {
    /// Load a class table, choosing the delimiter from the file extension
    /// (`.csv` is comma separated, anything else tab separated).
    ///
    /// # Errors
    ///
    /// Returns `ClassTableError::Io` if the file cannot be read, or a parse
    /// error if the content is invalid.
    pub fn load(path: &Path) -> Result<Self, ClassTableError> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ',',
            _ => '\t',
        };
        let content = std::fs::read_to_string(path)?;
        let table = Self::parse(&content, delimiter)?;
        debug!(
            "Loaded {} genes ({} resistance classes, {} beta-lactamase classes) from {}",
            table.len(),
            table.res_classes.len(),
            table.bla_classes.len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse class table text. The first non-comment line is the header.
    ///
    /// # Errors
    ///
    /// Returns `ClassTableError::MissingColumn` if `seqID` or `class` is not in
    /// the header, `ShortRow`/`MissingValue`/`DuplicateId` for bad data lines,
    /// or `Empty` if there are no data lines.
    pub fn parse(text: &str, delimiter: char) -> Result<Self, ClassTableError> {
        let mut columns: Option<Columns> = None;
        let mut genes = HashMap::new();
        let mut res_classes = BTreeSet::new();
        let mut bla_classes = BTreeSet::new();

        for (i, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split(delimiter).collect();

            let Some(cols) = &columns else {
                columns = Some(Columns::from_header(&fields)?);
                continue;
            };

            let line_num = i + 1;
            if fields.len() < cols.required_len() {
                return Err(ClassTableError::ShortRow {
                    line: line_num,
                    found: fields.len(),
                    expected: cols.required_len(),
                });
            }

            let seq_id = cell(&fields, Some(cols.seq_id)).ok_or(ClassTableError::MissingValue {
                column: "seqID",
                line: line_num,
            })?;
            let res_class = cell(&fields, Some(cols.res_class)).ok_or(ClassTableError::MissingValue {
                column: "class",
                line: line_num,
            })?;
            let bla_class = cell(&fields, cols.bla_class);

            match &bla_class {
                Some(bla) => {
                    bla_classes.insert(bla.clone());
                }
                None => {
                    res_classes.insert(res_class.clone());
                }
            }

            let info = GeneInfo {
                seq_id: seq_id.clone(),
                gene: cell(&fields, cols.gene),
                allele: cell(&fields, cols.allele),
                allele_symbol: cell(&fields, cols.allele_symbol),
                res_class,
                bla_class,
            };
            if genes.insert(seq_id.clone(), info).is_some() {
                return Err(ClassTableError::DuplicateId {
                    id: seq_id,
                    line: line_num,
                });
            }
        }

        if genes.is_empty() {
            return Err(ClassTableError::Empty);
        }

        Ok(Self {
            genes,
            res_classes: res_classes.into_iter().collect(),
            bla_classes: bla_classes.into_iter().collect(),
        })
    }

    /// Gene labels grouped by the output column their hits are reported under
    pub fn labels_by_column(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut by_column: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for info in self.genes.values() {
            by_column.entry(info.column()).or_default().insert(info.label());
        }
        by_column
    }

    /// Class columns in output order: resistance classes, then beta-lactamase
    /// classes not already listed
    pub fn class_columns(&self) -> Vec<String> {
        let mut columns = self.res_classes.clone();
        for bla in &self.bla_classes {
            if !columns.contains(bla) {
                columns.push(bla.clone());
            }
        }
        columns
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}
