use std::collections::HashSet;

use tracing::{debug, warn};

use crate::catalog::classes::ClassTable;
use crate::catalog::data_dir::DataDir;
use crate::core::species::{is_kp_complex, SpeciesCall};
use crate::core::types::{AmrThresholds, HitRecord, ModuleHeaders, ResultRow};
use crate::genotype::hits::{HitFinder, HitRequest};
use crate::genotype::pipeline::{AssemblyInput, GenotypingModule};
use crate::genotype::GenotypeError;
use crate::utils::validation::{
    check_open_range, find_executable, IDENTITY_RANGE, SPURIOUS_COVERAGE_RANGE,
};

pub const MODULE_NAME: &str = "klebsiella_pneumo_complex__amr";

pub const TRUNCATED_HITS_COLUMN: &str = "truncated_resistance_hits";
pub const SPURIOUS_HITS_COLUMN: &str = "spurious_resistance_hits";

pub const DEFAULT_ALIGNER: &str = "minimap2";

/// CLI flag names, used in validation messages
pub const MIN_IDENTITY_FLAG: &str = "--kpsc-amr-min-identity";
pub const MIN_COVERAGE_FLAG: &str = "--kpsc-amr-min-coverage";
pub const MIN_SPURIOUS_IDENTITY_FLAG: &str = "--kpsc-amr-min-spurious-identity";
pub const MIN_SPURIOUS_COVERAGE_FLAG: &str = "--kpsc-amr-min-spurious-coverage";

/// Configuration for the KpSC AMR module
#[derive(Debug, Clone)]
pub struct AmrConfig {
    pub thresholds: AmrThresholds,
    pub data_dir: DataDir,
    /// Aligner the hit finder depends on, checked before any assembly is run
    pub aligner: String,
}

impl AmrConfig {
    pub fn new(data_dir: DataDir) -> Self {
        Self {
            thresholds: AmrThresholds::default(),
            data_dir,
            aligner: DEFAULT_ALIGNER.to_string(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: AmrThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn with_aligner(mut self, aligner: impl Into<String>) -> Self {
        self.aligner = aligner.into();
        self
    }
}

/// Validate the four thresholds against their open intervals.
///
/// # Errors
///
/// Returns `ValidationError::OutOfRange` for the first threshold outside its interval.
pub fn check_thresholds(t: &AmrThresholds) -> Result<(), GenotypeError> {
    check_open_range(MIN_IDENTITY_FLAG, t.min_identity, IDENTITY_RANGE)?;
    check_open_range(MIN_COVERAGE_FLAG, t.min_coverage, IDENTITY_RANGE)?;
    check_open_range(MIN_SPURIOUS_IDENTITY_FLAG, t.min_spurious_identity, IDENTITY_RANGE)?;
    check_open_range(
        MIN_SPURIOUS_COVERAGE_FLAG,
        t.min_spurious_coverage,
        SPURIOUS_COVERAGE_RANGE,
    )?;
    Ok(())
}

/// Full output headers: class columns from the table, then the two
/// synthetic hit columns
pub fn full_headers(classes: &ClassTable) -> Vec<String> {
    let mut headers = classes.class_columns();
    for synthetic in [TRUNCATED_HITS_COLUMN, SPURIOUS_HITS_COLUMN] {
        if !headers.iter().any(|h| h == synthetic) {
            headers.push(synthetic.to_string());
        }
    }
    headers
}

/// Every hit column must be an output header.
///
/// # Errors
///
/// Returns `GenotypeError::UnexpectedColumn` naming the first unknown column.
pub fn check_hit_columns(headers: &[String], hits: &HitRecord) -> Result<(), GenotypeError> {
    let known: HashSet<&str> = headers.iter().map(String::as_str).collect();
    match hits.keys().find(|column| !known.contains(column.as_str())) {
        Some(column) => Err(GenotypeError::UnexpectedColumn(column.clone())),
        None => Ok(()),
    }
}

/// Acquired genes and mutations for the *Klebsiella pneumoniae* species complex
pub struct KpscAmrModule {
    config: AmrConfig,
    finder: Box<dyn HitFinder>,
}

impl KpscAmrModule {
    pub fn new(config: AmrConfig, finder: Box<dyn HitFinder>) -> Self {
        Self { config, finder }
    }

    pub fn config(&self) -> &AmrConfig {
        &self.config
    }
}

impl GenotypingModule for KpscAmrModule {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn description(&self) -> &str {
        "Genotyping acquired genes and mutations for the Klebsiella pneumoniae species complex"
    }

    fn prerequisite_modules(&self) -> Vec<String> {
        Vec::new()
    }

    fn headers(&self) -> Result<ModuleHeaders, GenotypeError> {
        let classes = ClassTable::load(&self.config.data_dir.class_file())?;
        Ok(ModuleHeaders {
            full: full_headers(&classes),
            stdout: Vec::new(),
        })
    }

    fn check_options(&self) -> Result<(), GenotypeError> {
        check_thresholds(&self.config.thresholds)
    }

    fn check_external_programs(&self) -> Result<Vec<String>, GenotypeError> {
        let mut programs = vec![self.config.aligner.clone()];
        programs.extend(self.finder.programs());
        for program in &programs {
            let path = find_executable(program)?;
            debug!("Found {}: {}", program, path.display());
        }
        Ok(programs)
    }

    fn results(
        &self,
        assembly: &AssemblyInput,
        species: Option<&SpeciesCall>,
    ) -> Result<ResultRow, GenotypeError> {
        if let Some(call) = species.filter(|call| !is_kp_complex(call)) {
            warn!(
                "{}: species '{}' is outside the Kp-complex, resistance calls may be unreliable",
                assembly.name, call.species
            );
        }

        let references = self.config.data_dir.resolve()?;
        let classes = ClassTable::load(&references.classes)?;
        let headers = full_headers(&classes);

        let hits = self.finder.find_hits(&HitRequest {
            assembly: &assembly.path,
            index: &assembly.index,
            references: &references,
            thresholds: &self.config.thresholds,
        })?;
        debug!("{}: {} columns with hits", assembly.name, hits.len());

        check_hit_columns(&headers, &hits)?;
        Ok(ResultRow::from_hits(&headers, &hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::data_dir::{
        CLASS_FILE, OMP_FILE, QRDR_FILE, REFERENCE_FILE, TRUNCATION_FILE,
    };
    use crate::genotype::hits::HitFinderError;
    use std::collections::BTreeSet;
    use std::path::Path;

    const CLASSES: &str = "\
seqID,gene,allele_symbol,class,bla_class
1,aac(3)-IIa,Aac3-IIa,AGly_acquired,NA
2,blaOXA-1,OXA-1,Bla,Bla_acquired
3,blaKPC-2,KPC-2,Bla,Bla_Carb_acquired
4,tet(A),TetA,Tet_acquired,NA
";

    /// Returns a fixed hit mapping regardless of the request
    struct FixedHits(HitRecord);

    impl HitFinder for FixedHits {
        fn find_hits(&self, _request: &HitRequest<'_>) -> Result<HitRecord, HitFinderError> {
            Ok(self.0.clone())
        }
    }

    fn hits(entries: &[(&str, &[&str])]) -> HitRecord {
        entries
            .iter()
            .map(|(column, labels)| {
                (
                    (*column).to_string(),
                    labels.iter().map(|l| (*l).to_string()).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    fn write_data_dir(dir: &Path) {
        std::fs::write(dir.join(CLASS_FILE), CLASSES).unwrap();
        for name in [REFERENCE_FILE, QRDR_FILE, TRUNCATION_FILE, OMP_FILE] {
            std::fs::write(dir.join(name), ">s\nACGT\n").unwrap();
        }
    }

    fn module(dir: &Path, record: HitRecord) -> KpscAmrModule {
        KpscAmrModule::new(
            AmrConfig::new(DataDir::new(dir)),
            Box::new(FixedHits(record)),
        )
    }

    #[test]
    fn test_module_metadata() {
        let m = module(Path::new("unused"), HitRecord::new());
        assert_eq!(m.name(), "klebsiella_pneumo_complex__amr");
        assert!(m.description().contains("Klebsiella pneumoniae species complex"));
        assert!(m.prerequisite_modules().is_empty());
    }

    #[test]
    fn test_headers() {
        let dir = tempfile::tempdir().unwrap();
        write_data_dir(dir.path());

        let headers = module(dir.path(), HitRecord::new()).headers().unwrap();
        assert_eq!(
            headers.full,
            vec![
                "AGly_acquired",
                "Tet_acquired",
                "Bla_Carb_acquired",
                "Bla_acquired",
                "truncated_resistance_hits",
                "spurious_resistance_hits",
            ]
        );
        assert!(headers.stdout.is_empty());

        let unique: HashSet<&String> = headers.full.iter().collect();
        assert_eq!(unique.len(), headers.full.len());
    }

    #[test]
    fn test_valid_thresholds_pass() {
        let cases = [
            (90.0, 80.0, 80.0, 40.0),
            (50.1, 50.1, 50.1, 30.1),
            (99.9, 99.9, 99.9, 99.9),
        ];
        for (id, cov, sp_id, sp_cov) in cases {
            let t = AmrThresholds {
                min_identity: id,
                min_coverage: cov,
                min_spurious_identity: sp_id,
                min_spurious_coverage: sp_cov,
            };
            assert!(check_thresholds(&t).is_ok(), "{t:?}");
        }
    }

    #[test]
    fn test_boundary_thresholds_fail() {
        let base = AmrThresholds::default();
        let cases = [
            AmrThresholds { min_identity: 50.0, ..base },
            AmrThresholds { min_identity: 100.0, ..base },
            AmrThresholds { min_coverage: 50.0, ..base },
            AmrThresholds { min_spurious_identity: 100.0, ..base },
            AmrThresholds { min_spurious_coverage: 30.0, ..base },
            AmrThresholds { min_spurious_coverage: 100.0, ..base },
            AmrThresholds { min_spurious_coverage: 10.0, ..base },
        ];
        for t in cases {
            assert!(check_thresholds(&t).is_err(), "{t:?}");
        }
    }

    #[test]
    fn test_spurious_coverage_uses_lower_bound() {
        // 40 is invalid for identity but valid for spurious coverage
        let t = AmrThresholds {
            min_spurious_coverage: 35.0,
            ..AmrThresholds::default()
        };
        assert!(check_thresholds(&t).is_ok());
        let t = AmrThresholds {
            min_spurious_identity: 40.0,
            ..AmrThresholds::default()
        };
        let err = check_thresholds(&t).unwrap_err();
        assert!(err.to_string().contains(MIN_SPURIOUS_IDENTITY_FLAG));
    }

    #[test]
    fn test_results_format_row() {
        let dir = tempfile::tempdir().unwrap();
        write_data_dir(dir.path());

        let record = hits(&[
            ("Bla_acquired", &["TEM-1D", "OXA-1"]),
            ("truncated_resistance_hits", &["OmpK36-25%"]),
        ]);
        let row = module(dir.path(), record)
            .results(&AssemblyInput::new(dir.path().join("a.fasta")), None)
            .unwrap();

        assert_eq!(row.len(), 6);
        assert_eq!(row.get("Bla_acquired"), Some("OXA-1;TEM-1D"));
        assert_eq!(row.get("truncated_resistance_hits"), Some("OmpK36-25%"));
        assert_eq!(row.get("AGly_acquired"), Some("-"));
        assert_eq!(row.get("spurious_resistance_hits"), Some("-"));
    }

    #[test]
    fn test_results_reject_unknown_column() {
        let dir = tempfile::tempdir().unwrap();
        write_data_dir(dir.path());

        let record = hits(&[("Bla_acquired", &["OXA-1"]), ("Mystery_acquired", &["X"])]);
        let err = module(dir.path(), record)
            .results(&AssemblyInput::new(dir.path().join("a.fasta")), None)
            .unwrap_err();

        assert!(matches!(&err, GenotypeError::UnexpectedColumn(c) if c == "Mystery_acquired"));
        assert!(err.to_string().contains("Mystery_acquired"));
    }

    #[test]
    fn test_results_missing_reference_file() {
        let dir = tempfile::tempdir().unwrap();
        write_data_dir(dir.path());
        std::fs::remove_file(dir.path().join(OMP_FILE)).unwrap();

        let err = module(dir.path(), HitRecord::new())
            .results(&AssemblyInput::new(dir.path().join("a.fasta")), None)
            .unwrap_err();
        assert!(err.to_string().contains(OMP_FILE));
    }

    #[test]
    fn test_results_for_non_kp_species_still_run() {
        let dir = tempfile::tempdir().unwrap();
        write_data_dir(dir.path());

        let species = SpeciesCall::new("Escherichia coli");
        let row = module(dir.path(), hits(&[("Tet_acquired", &["TetA"])]))
            .results(&AssemblyInput::new(dir.path().join("a.fasta")), Some(&species))
            .unwrap();
        assert_eq!(row.get("Tet_acquired"), Some("TetA"));
    }

    #[test]
    fn test_missing_aligner() {
        let config = AmrConfig::new(DataDir::new("unused"))
            .with_aligner("definitely-not-minimap2-kpsc");
        let m = KpscAmrModule::new(config, Box::new(FixedHits(HitRecord::new())));
        let err = m.check_external_programs().unwrap_err();
        assert!(err.to_string().contains("definitely-not-minimap2-kpsc"));
    }
}
