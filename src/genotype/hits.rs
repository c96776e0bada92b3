//! Seam to the external hit finder.
//!
//! Alignment, hit reconciliation and identity/coverage filtering happen
//! outside this crate. [`HitFinder`] is the contract: given an assembly, its
//! aligner index, the reference files and the thresholds, return the hits
//! grouped by output column.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::catalog::data_dir::ReferenceFiles;
use crate::core::types::{AmrThresholds, HitRecord};

#[derive(Error, Debug)]
pub enum HitFinderError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Invalid hit mapping from {program}: {source}")]
    InvalidOutput {
        program: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything the hit finder needs for one assembly
#[derive(Debug, Clone, Copy)]
pub struct HitRequest<'a> {
    pub assembly: &'a Path,
    pub index: &'a Path,
    pub references: &'a ReferenceFiles,
    pub thresholds: &'a AmrThresholds,
}

pub trait HitFinder: Send + Sync {
    /// Find hits for one assembly
    ///
    /// # Errors
    ///
    /// Returns an error if the hit finder cannot produce a mapping.
    fn find_hits(&self, request: &HitRequest<'_>) -> Result<HitRecord, HitFinderError>;

    /// External programs this hit finder runs
    fn programs(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Runs an external program that prints the hit mapping as a JSON object of
/// string arrays on stdout, e.g. `{"Bla_acquired": ["OXA-1", "TEM-1D"]}`
#[derive(Debug, Clone)]
pub struct CommandHitFinder {
    program: PathBuf,
}

impl CommandHitFinder {
    pub const DEFAULT_PROGRAM: &'static str = "resminimap";

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, request: &HitRequest<'_>) -> Command {
        let refs = request.references;
        let t = request.thresholds;
        let mut cmd = Command::new(&self.program);
        cmd.arg("--assembly")
            .arg(request.assembly)
            .arg("--index")
            .arg(request.index)
            .arg("--reference")
            .arg(&refs.reference)
            .arg("--classes")
            .arg(&refs.classes)
            .arg("--qrdr")
            .arg(&refs.qrdr)
            .arg("--truncation")
            .arg(&refs.truncation)
            .arg("--omp")
            .arg(&refs.omp)
            .arg("--min-identity")
            .arg(t.min_identity.to_string())
            .arg("--min-coverage")
            .arg(t.min_coverage.to_string())
            .arg("--min-spurious-coverage")
            .arg(t.min_spurious_coverage.to_string())
            .arg("--min-spurious-identity")
            .arg(t.min_spurious_identity.to_string());
        cmd
    }
}

impl Default for CommandHitFinder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl HitFinder for CommandHitFinder {
    fn programs(&self) -> Vec<String> {
        vec![self.program.display().to_string()]
    }

    fn find_hits(&self, request: &HitRequest<'_>) -> Result<HitRecord, HitFinderError> {
        let program = self.program.display().to_string();
        debug!("Running {} on {}", program, request.assembly.display());

        let output = self
            .command(request)
            .output()
            .map_err(|source| HitFinderError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(HitFinderError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_hit_mapping(&output.stdout)
            .map_err(|source| HitFinderError::InvalidOutput { program, source })
    }
}

/// Parse a JSON object of column -> array of labels
///
/// # Errors
///
/// Returns the JSON error if the bytes are not an object of string arrays.
pub fn parse_hit_mapping(bytes: &[u8]) -> Result<HitRecord, serde_json::Error> {
    let raw: BTreeMap<String, Vec<String>> = serde_json::from_slice(bytes)?;
    Ok(raw
        .into_iter()
        .map(|(column, labels)| (column, labels.into_iter().collect::<BTreeSet<_>>()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hit_mapping() {
        let hits = parse_hit_mapping(br#"{"Bla_acquired": ["TEM-1D", "OXA-1", "OXA-1"], "Tet_acquired": []}"#)
            .unwrap();
        assert_eq!(hits.len(), 2);
        let bla: Vec<&str> = hits["Bla_acquired"].iter().map(String::as_str).collect();
        assert_eq!(bla, vec!["OXA-1", "TEM-1D"]);
        assert!(hits["Tet_acquired"].is_empty());
    }

    #[test]
    fn test_parse_hit_mapping_rejects_non_object() {
        assert!(parse_hit_mapping(b"[1, 2, 3]").is_err());
        assert!(parse_hit_mapping(br#"{"a": "not-a-list"}"#).is_err());
        assert!(parse_hit_mapping(b"").is_err());
    }

    #[test]
    fn test_command_arguments() {
        let refs = ReferenceFiles {
            classes: PathBuf::from("d/classes.csv"),
            reference: PathBuf::from("d/ref.fasta"),
            qrdr: PathBuf::from("d/qrdr.fasta"),
            truncation: PathBuf::from("d/trunc.fasta"),
            omp: PathBuf::from("d/omp.fasta"),
        };
        let thresholds = AmrThresholds::default();
        let request = HitRequest {
            assembly: Path::new("a.fasta"),
            index: Path::new("a.mmi"),
            references: &refs,
            thresholds: &thresholds,
        };

        let cmd = CommandHitFinder::default().command(&request);
        assert_eq!(cmd.get_program(), "resminimap");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        let pos = |flag: &str| args.iter().position(|a| a == flag).unwrap();
        assert_eq!(args[pos("--index") + 1], "a.mmi");
        assert_eq!(args[pos("--min-identity") + 1], "90");
        assert_eq!(args[pos("--min-spurious-coverage") + 1], "40");
    }

    #[test]
    fn test_spawn_failure() {
        let refs = ReferenceFiles {
            classes: PathBuf::new(),
            reference: PathBuf::new(),
            qrdr: PathBuf::new(),
            truncation: PathBuf::new(),
            omp: PathBuf::new(),
        };
        let thresholds = AmrThresholds::default();
        let request = HitRequest {
            assembly: Path::new("a.fasta"),
            index: Path::new("a.fasta"),
            references: &refs,
            thresholds: &thresholds,
        };
        let finder = CommandHitFinder::new("/nonexistent/kpsc-hit-finder");
        assert!(matches!(
            finder.find_hits(&request),
            Err(HitFinderError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_exit_reports_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("failing-finder");
        std::fs::write(&script, "#!/bin/sh\necho 'index is corrupt' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let refs = ReferenceFiles {
            classes: PathBuf::new(),
            reference: PathBuf::new(),
            qrdr: PathBuf::new(),
            truncation: PathBuf::new(),
            omp: PathBuf::new(),
        };
        let thresholds = AmrThresholds::default();
        let request = HitRequest {
            assembly: Path::new("a.fasta"),
            index: Path::new("a.fasta"),
            references: &refs,
            thresholds: &thresholds,
        };

        let err = CommandHitFinder::new(&script).find_hits(&request).unwrap_err();
        assert!(err.to_string().contains("index is corrupt"));
    }
}
