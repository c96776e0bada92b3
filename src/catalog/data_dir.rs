//! Location of the bundled reference data.
//!
//! The directory is injected by the caller (CLI flag, test fixture) rather
//! than derived from where the binary lives. Expected layout:
//!
//! | File | Contents |
//! |------|----------|
//! | `CARD_AMR_clustered.csv` | gene -> resistance/drug class table |
//! | `CARD_v3.1.13.fasta` | full nucleotide reference for acquired genes |
//! | `QRDR_120.fasta` | quinolone-resistance-determining region markers |
//! | `MgrB_and_PmrB.fasta` | truncation markers |
//! | `OmpK.fasta` | outer-membrane-protein markers |

use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use noodles::fasta;
use thiserror::Error;

pub const CLASS_FILE: &str = "CARD_AMR_clustered.csv";
pub const REFERENCE_FILE: &str = "CARD_v3.1.13.fasta";
pub const QRDR_FILE: &str = "QRDR_120.fasta";
pub const TRUNCATION_FILE: &str = "MgrB_and_PmrB.fasta";
pub const OMP_FILE: &str = "OmpK.fasta";

#[derive(Error, Debug)]
pub enum DataDirError {
    #[error("Data directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("Reference data file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read FASTA {path}: {message}")]
    Fasta { path: PathBuf, message: String },
}

/// Reference data directory for the KpSC AMR module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

/// Resolved paths to every reference file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceFiles {
    pub classes: PathBuf,
    pub reference: PathBuf,
    pub qrdr: PathBuf,
    pub truncation: PathBuf,
    pub omp: PathBuf,
}

impl ReferenceFiles {
    /// FASTA references with a short label, in reporting order
    pub fn fasta_files(&self) -> [(&'static str, &Path); 4] {
        [
            ("reference", self.reference.as_path()),
            ("qrdr", self.qrdr.as_path()),
            ("truncation", self.truncation.as_path()),
            ("omp", self.omp.as_path()),
        ]
    }
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn class_file(&self) -> PathBuf {
        self.root.join(CLASS_FILE)
    }

    pub fn reference(&self) -> PathBuf {
        self.root.join(REFERENCE_FILE)
    }

    pub fn qrdr(&self) -> PathBuf {
        self.root.join(QRDR_FILE)
    }

    pub fn truncation(&self) -> PathBuf {
        self.root.join(TRUNCATION_FILE)
    }

    pub fn omp(&self) -> PathBuf {
        self.root.join(OMP_FILE)
    }

    /// Resolve all reference files, failing on the first one that is missing.
    ///
    /// # Errors
    ///
    /// Returns `DataDirError::MissingDir` if the directory does not exist, or
    /// `DataDirError::MissingFile` naming the first absent file.
    pub fn resolve(&self) -> Result<ReferenceFiles, DataDirError> {
        if !self.root.is_dir() {
            return Err(DataDirError::MissingDir(self.root.clone()));
        }
        let files = ReferenceFiles {
            classes: self.class_file(),
            reference: self.reference(),
            qrdr: self.qrdr(),
            truncation: self.truncation(),
            omp: self.omp(),
        };
        for path in std::iter::once(files.classes.as_path())
            .chain(files.fasta_files().iter().map(|(_, p)| *p))
        {
            if !path.is_file() {
                return Err(DataDirError::MissingFile(path.to_path_buf()));
            }
        }
        Ok(files)
    }
}

/// Count the records in a FASTA file (plain or gzip compressed)
///
/// # Errors
///
/// Returns `DataDirError::Fasta` if the file cannot be opened or parsed.
pub fn count_fasta_records(path: &Path) -> Result<usize, DataDirError> {
    let to_error = |message: String| DataDirError::Fasta {
        path: path.to_path_buf(),
        message,
    };

    let file = std::fs::File::open(path).map_err(|e| to_error(e.to_string()))?;
    let is_gzipped = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"));

    let reader: Box<dyn BufRead> = if is_gzipped {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut count = 0;
    for result in fasta_reader.records() {
        result.map_err(|e| to_error(e.to_string()))?;
        count += 1;
    }
    Ok(count)
}
