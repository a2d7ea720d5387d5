//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the
//! institution catalog from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::{BranchId, Subject, SubjectId, TermId};

use super::types::{CatalogConfig, InstitutionMetadata, SubjectsConfig};

/// Loads and provides access to the institution catalog.
///
/// The `ConfigLoader` reads YAML configuration files from a directory
/// and provides methods to query subjects and exam durations.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/sample/
/// ├── institution.yaml   # Institution metadata and exam durations
/// └── subjects.yaml      # Subject catalog
/// ```
///
/// # Example
///
/// ```no_run
/// use academic_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sample").unwrap();
///
/// let subject = loader.get_subject(101).unwrap();
/// println!("Subject: {} ({} marks)", subject.name, subject.max_marks);
///
/// for subject in loader.subjects_for_term(1) {
///     println!("Term 1: {}", subject.code);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: CatalogConfig,
    source: String,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/sample")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - The catalog is inconsistent: duplicate subject ids, a subject with
    ///   zero maximum marks, or no exam durations (`ConfigParseError`)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use academic_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/sample")?;
    /// # Ok::<(), academic_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let institution_path = path.join("institution.yaml");
        let metadata = Self::load_yaml::<InstitutionMetadata>(&institution_path)?;

        let subjects_path = path.join("subjects.yaml");
        let subjects_config = Self::load_yaml::<SubjectsConfig>(&subjects_path)?;

        Self::validate(
            &metadata,
            &subjects_config.subjects,
            &path.display().to_string(),
        )?;

        let config = CatalogConfig::new(metadata, subjects_config.subjects);
        Ok(Self {
            config,
            source: path.display().to_string(),
        })
    }

    /// Builds a loader from a catalog assembled in code.
    ///
    /// The catalog goes through the same consistency checks as [`load`](Self::load).
    pub fn from_parts(metadata: InstitutionMetadata, subjects: Vec<Subject>) -> EngineResult<Self> {
        Self::validate(&metadata, &subjects, "<in-memory>")?;
        Ok(Self {
            config: CatalogConfig::new(metadata, subjects),
            source: "<in-memory>".to_string(),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(metadata: &InstitutionMetadata, subjects: &[Subject], path: &str) -> EngineResult<()> {
        let parse_error = |message: String| EngineError::ConfigParseError {
            path: path.to_string(),
            message,
        };

        if metadata.exam_durations_minutes.is_empty() {
            return Err(parse_error(
                "exam_durations_minutes must list at least one duration".to_string(),
            ));
        }
        if metadata.exam_durations_minutes.contains(&0) {
            return Err(parse_error(
                "exam_durations_minutes must all be greater than zero".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for subject in subjects {
            if !seen.insert(subject.id) {
                return Err(parse_error(format!("duplicate subject id {}", subject.id)));
            }
            if subject.max_marks == 0 {
                return Err(parse_error(format!(
                    "subject {} ({}) has zero max_marks",
                    subject.id, subject.code
                )));
            }
        }
        Ok(())
    }

    /// Returns the underlying catalog.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns the institution metadata.
    pub fn institution(&self) -> &InstitutionMetadata {
        self.config.institution()
    }

    /// Where the catalog was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Gets a subject by its id.
    ///
    /// # Returns
    ///
    /// Returns the subject if found, or `SubjectNotFound` error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use academic_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/sample")?;
    /// let subject = loader.get_subject(101)?;
    /// println!("Subject: {}", subject.name);
    /// # Ok::<(), academic_engine::error::EngineError>(())
    /// ```
    pub fn get_subject(&self, subject_id: SubjectId) -> EngineResult<&Subject> {
        self.config
            .subjects()
            .get(&subject_id)
            .ok_or(EngineError::SubjectNotFound { subject_id })
    }

    /// Subjects in a term across all branches, ordered by id.
    pub fn subjects_for_term(&self, term_id: TermId) -> Vec<Subject> {
        self.config.subjects_in_term(term_id).cloned().collect()
    }

    /// Subjects taught to one branch in one term, ordered by id.
    pub fn subjects_for_cohort(&self, branch_id: BranchId, term_id: TermId) -> Vec<Subject> {
        self.config
            .subjects_in_cohort(branch_id, term_id)
            .cloned()
            .collect()
    }

    /// Returns true if exams may be proposed with this sitting length.
    pub fn allows_duration(&self, minutes: u32) -> bool {
        self.institution().exam_durations_minutes.contains(&minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_path() -> &'static str {
        "./config/sample"
    }

    fn make_metadata(durations: Vec<u32>) -> InstitutionMetadata {
        InstitutionMetadata {
            code: "TST".to_string(),
            name: "Test Institute".to_string(),
            academic_year: "2025-26".to_string(),
            exam_durations_minutes: durations,
        }
    }

    fn make_subject(id: SubjectId, max_marks: u32) -> Subject {
        Subject {
            id,
            name: format!("Subject {id}"),
            code: format!("S{id}"),
            branch_id: 1,
            term_id: 1,
            max_marks,
        }
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.institution().code, "GEC");
        assert_eq!(loader.institution().exam_durations_minutes, vec![50, 90]);
    }

    #[test]
    fn test_get_subject() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let subject = loader.get_subject(101).unwrap();
        assert_eq!(subject.code, "MA101");
        assert_eq!(subject.max_marks, 100);
    }

    #[test]
    fn test_get_subject_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.get_subject(9999) {
            Err(EngineError::SubjectNotFound { subject_id }) => {
                assert_eq!(subject_id, 9999);
            }
            _ => panic!("Expected SubjectNotFound error"),
        }
    }

    #[test]
    fn test_subjects_for_term_and_cohort() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let term_one: Vec<SubjectId> = loader.subjects_for_term(1).iter().map(|s| s.id).collect();
        assert_eq!(term_one, vec![101, 102, 103, 104, 105, 151, 152]);

        let cohort: Vec<SubjectId> = loader
            .subjects_for_cohort(2, 1)
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(cohort, vec![151, 152]);
    }

    #[test]
    fn test_allows_duration() {
        let loader = ConfigLoader::load(config_path()).unwrap();
        assert!(loader.allows_duration(50));
        assert!(loader.allows_duration(90));
        assert!(!loader.allows_duration(60));
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        match ConfigLoader::load("/nonexistent/path") {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("institution.yaml"));
            }
            _ => panic!("Expected ConfigNotFound error"),
        }
    }

    #[test]
    fn test_from_parts_rejects_duplicate_ids() {
        let result = ConfigLoader::from_parts(
            make_metadata(vec![50]),
            vec![make_subject(1, 100), make_subject(1, 50)],
        );
        assert!(matches!(
            result,
            Err(EngineError::ConfigParseError { ref message, .. }) if message.contains("duplicate")
        ));
    }

    #[test]
    fn test_from_parts_rejects_zero_max_marks() {
        let result =
            ConfigLoader::from_parts(make_metadata(vec![50]), vec![make_subject(1, 0)]);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_from_parts_rejects_missing_durations() {
        let result = ConfigLoader::from_parts(make_metadata(vec![]), vec![make_subject(1, 100)]);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));

        let result = ConfigLoader::from_parts(make_metadata(vec![0]), vec![make_subject(1, 100)]);
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_from_parts_keeps_subjects_ordered() {
        let loader = ConfigLoader::from_parts(
            make_metadata(vec![50]),
            vec![make_subject(3, 100), make_subject(1, 100), make_subject(2, 100)],
        )
        .unwrap();
        let ids: Vec<SubjectId> = loader.subjects_for_term(1).iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(loader.source(), "<in-memory>");
    }
}
