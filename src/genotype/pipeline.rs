use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::core::species::SpeciesCall;
use crate::core::types::{ModuleHeaders, ResultRow};
use crate::genotype::GenotypeError;

/// Separator between module name and column name in combined headers
pub const COLUMN_SEPARATOR: &str = "__";

/// Extensions stripped from assembly file names to get the sample name
const ASSEMBLY_EXTENSIONS: &[&str] = &["fasta", "fa", "fna", "fas", "fsa"];

/// A genotyping module as seen by the host pipeline
pub trait GenotypingModule: Send + Sync {
    /// Unique module name, used to prefix its columns
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Names of modules whose results must be present before this one runs
    fn prerequisite_modules(&self) -> Vec<String>;

    /// Output columns
    ///
    /// # Errors
    ///
    /// Returns an error if the module's reference data cannot be read.
    fn headers(&self) -> Result<ModuleHeaders, GenotypeError>;

    /// Validate user-supplied options
    ///
    /// # Errors
    ///
    /// Returns an error for any option outside its allowed range.
    fn check_options(&self) -> Result<(), GenotypeError>;

    /// Check external programs, returning the names found
    ///
    /// # Errors
    ///
    /// Returns an error naming the first program that cannot be found.
    fn check_external_programs(&self) -> Result<Vec<String>, GenotypeError>;

    /// Genotype one assembly
    ///
    /// # Errors
    ///
    /// Returns an error if genotyping fails or produces columns outside the headers.
    fn results(
        &self,
        assembly: &AssemblyInput,
        species: Option<&SpeciesCall>,
    ) -> Result<ResultRow, GenotypeError>;
}

/// An assembly to genotype, with the aligner index to use for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssemblyInput {
    /// Sample name (file name without FASTA/gzip extensions)
    pub name: String,
    pub path: PathBuf,
    /// Prebuilt `<name>.mmi` next to the assembly, or the assembly itself
    pub index: PathBuf,
}

impl AssemblyInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = assembly_name(&path);
        let sibling = path.with_file_name(format!("{name}.mmi"));
        let index = if sibling.is_file() {
            sibling
        } else {
            path.clone()
        };
        Self { name, path, index }
    }

    #[must_use]
    pub fn with_index(mut self, index: impl Into<PathBuf>) -> Self {
        self.index = index.into();
        self
    }
}

fn assembly_name(path: &Path) -> String {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if let Some(stripped) = name.strip_suffix(".gz") {
        name = stripped.to_string();
    }
    if let Some((stem, ext)) = name.rsplit_once('.') {
        if !stem.is_empty() && ASSEMBLY_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            name = stem.to_string();
        }
    }
    name
}

/// Results for one assembly: one row per module, in pipeline order
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyResult {
    pub assembly: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    pub rows: Vec<(String, ResultRow)>,
}

impl AssemblyResult {
    /// All values across modules, in combined-header order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flat_map(|(_, row)| row.iter().map(|(_, v)| v))
    }
}

/// Runs a fixed list of modules over assemblies
pub struct Pipeline {
    modules: Vec<Box<dyn GenotypingModule>>,
}

impl Pipeline {
    pub fn new(modules: Vec<Box<dyn GenotypingModule>>) -> Self {
        Self { modules }
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Check prerequisites, options and external programs of every module.
    ///
    /// # Errors
    ///
    /// Returns the first failure found.
    pub fn check(&self) -> Result<Vec<String>, GenotypeError> {
        for module in &self.modules {
            for prerequisite in module.prerequisite_modules() {
                if !self.modules.iter().any(|m| m.name() == prerequisite) {
                    return Err(GenotypeError::MissingPrerequisite {
                        module: module.name().to_string(),
                        prerequisite,
                    });
                }
            }
            module.check_options()?;
        }

        let mut programs = Vec::new();
        for module in &self.modules {
            for program in module.check_external_programs()? {
                if !programs.contains(&program) {
                    programs.push(program);
                }
            }
        }
        Ok(programs)
    }

    /// Full headers of all modules, prefixed with `<module>__`
    ///
    /// # Errors
    ///
    /// Returns the first module error.
    pub fn headers(&self) -> Result<Vec<String>, GenotypeError> {
        let mut headers = Vec::new();
        for module in &self.modules {
            let module_headers = module.headers()?;
            headers.extend(
                module_headers
                    .full
                    .iter()
                    .map(|column| format!("{}{COLUMN_SEPARATOR}{column}", module.name())),
            );
        }
        Ok(headers)
    }

    /// Genotype every assembly, in parallel on the current rayon pool.
    ///
    /// Output order matches input order. The first error aborts the run.
    ///
    /// # Errors
    ///
    /// Returns `GenotypeError::NoAssemblies` for an empty input, or the first
    /// check or module error.
    pub fn run(
        &self,
        assemblies: &[AssemblyInput],
        species: Option<&SpeciesCall>,
    ) -> Result<Vec<AssemblyResult>, GenotypeError> {
        if assemblies.is_empty() {
            return Err(GenotypeError::NoAssemblies);
        }

        let programs = self.check()?;
        if !programs.is_empty() {
            info!("External programs found: {}", programs.join(", "));
        }

        assemblies
            .par_iter()
            .map(|assembly| self.genotype(assembly, species))
            .collect()
    }

    fn genotype(
        &self,
        assembly: &AssemblyInput,
        species: Option<&SpeciesCall>,
    ) -> Result<AssemblyResult, GenotypeError> {
        info!("Genotyping {}", assembly.path.display());
        let mut rows = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            rows.push((module.name().to_string(), module.results(assembly, species)?));
        }
        Ok(AssemblyResult {
            assembly: assembly.name.clone(),
            species: species.map(|call| call.species.clone()),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::HitRecord;

    /// Module with one column whose value is the assembly name
    struct EchoModule {
        name: &'static str,
        prerequisites: Vec<String>,
        valid: bool,
    }

    impl EchoModule {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                prerequisites: Vec::new(),
                valid: true,
            }
        }
    }

    impl GenotypingModule for EchoModule {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "echo"
        }

        fn prerequisite_modules(&self) -> Vec<String> {
            self.prerequisites.clone()
        }

        fn headers(&self) -> Result<ModuleHeaders, GenotypeError> {
            Ok(ModuleHeaders {
                full: vec!["sample".to_string()],
                stdout: Vec::new(),
            })
        }

        fn check_options(&self) -> Result<(), GenotypeError> {
            if self.valid {
                Ok(())
            } else {
                Err(GenotypeError::NoAssemblies)
            }
        }

        fn check_external_programs(&self) -> Result<Vec<String>, GenotypeError> {
            Ok(vec!["minimap2".to_string()])
        }

        fn results(
            &self,
            assembly: &AssemblyInput,
            _species: Option<&SpeciesCall>,
        ) -> Result<ResultRow, GenotypeError> {
            let mut hits = HitRecord::new();
            hits.insert("sample".to_string(), [assembly.name.clone()].into());
            Ok(ResultRow::from_hits(&["sample".to_string()], &hits))
        }
    }

    #[test]
    fn test_assembly_name() {
        assert_eq!(assembly_name(Path::new("dir/SAMN001.fasta")), "SAMN001");
        assert_eq!(assembly_name(Path::new("dir/SAMN001.fna.gz")), "SAMN001");
        assert_eq!(assembly_name(Path::new("a.b.fa")), "a.b");
        assert_eq!(assembly_name(Path::new("contigs.txt")), "contigs.txt");
        assert_eq!(assembly_name(Path::new(".fasta")), ".fasta");
    }

    #[test]
    fn test_assembly_index_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("s1.fasta");
        std::fs::write(&fasta, ">c\nACGT\n").unwrap();

        assert_eq!(AssemblyInput::new(&fasta).index, fasta);

        let mmi = dir.path().join("s1.mmi");
        std::fs::write(&mmi, b"MMI").unwrap();
        assert_eq!(AssemblyInput::new(&fasta).index, mmi);

        let custom = AssemblyInput::new(&fasta).with_index("/tmp/other.mmi");
        assert_eq!(custom.index, PathBuf::from("/tmp/other.mmi"));
    }

    #[test]
    fn test_run_preserves_input_order() {
        let pipeline = Pipeline::new(vec![Box::new(EchoModule::new("echo"))]);
        let inputs: Vec<AssemblyInput> = (0..20)
            .map(|i| AssemblyInput::new(format!("/nonexistent/s{i}.fasta")))
            .collect();

        let species = SpeciesCall::new("Klebsiella pneumoniae");
        let results = pipeline.run(&inputs, Some(&species)).unwrap();

        assert_eq!(results.len(), 20);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.assembly, format!("s{i}"));
            assert_eq!(result.species.as_deref(), Some("Klebsiella pneumoniae"));
            assert_eq!(result.values().collect::<Vec<_>>(), vec![format!("s{i}")]);
        }
    }

    #[test]
    fn test_run_rejects_empty_input() {
        let pipeline = Pipeline::new(vec![Box::new(EchoModule::new("echo"))]);
        assert!(matches!(
            pipeline.run(&[], None),
            Err(GenotypeError::NoAssemblies)
        ));
    }

    #[test]
    fn test_invalid_options_stop_before_results() {
        let mut module = EchoModule::new("echo");
        module.valid = false;
        let pipeline = Pipeline::new(vec![Box::new(module)]);

        let inputs = vec![AssemblyInput::new("/nonexistent/a.fasta")];
        assert!(pipeline.run(&inputs, None).is_err());
    }

    #[test]
    fn test_missing_prerequisite() {
        let mut module = EchoModule::new("second");
        module.prerequisites = vec!["first".to_string()];
        let pipeline = Pipeline::new(vec![Box::new(module)]);

        match pipeline.check() {
            Err(GenotypeError::MissingPrerequisite { module, prerequisite }) => {
                assert_eq!(module, "second");
                assert_eq!(prerequisite, "first");
            }
            other => panic!("expected missing prerequisite, got {other:?}"),
        }
    }

    #[test]
    fn test_headers_are_prefixed_and_programs_deduplicated() {
        let pipeline = Pipeline::new(vec![
            Box::new(EchoModule::new("one")),
            Box::new(EchoModule::new("two")),
        ]);
        assert_eq!(pipeline.headers().unwrap(), vec!["one__sample", "two__sample"]);
        assert_eq!(pipeline.check().unwrap(), vec!["minimap2"]);
    }
}
