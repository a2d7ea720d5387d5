//! Configuration types for the institution catalog.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::{BranchId, Subject, SubjectId, TermId};

/// Metadata about the institution.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionMetadata {
    /// Short institution code (e.g., "GEC").
    pub code: String,
    /// The human-readable name of the institution.
    pub name: String,
    /// The academic year the catalog applies to (e.g., "2025-26").
    pub academic_year: String,
    /// Exam sitting lengths that may be proposed, in minutes.
    pub exam_durations_minutes: Vec<u32>,
}

/// Subjects configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectsConfig {
    /// Every subject offered, across all branches and terms.
    pub subjects: Vec<Subject>,
}

/// The complete catalog loaded from YAML files.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    metadata: InstitutionMetadata,
    /// Subjects keyed by id, so iteration is ordered by id.
    subjects: BTreeMap<SubjectId, Subject>,
}

impl CatalogConfig {
    /// Creates a catalog from its component parts.
    ///
    /// Later subjects with a duplicate id replace earlier ones; the loader
    /// rejects duplicates before reaching this point.
    pub fn new(metadata: InstitutionMetadata, subjects: Vec<Subject>) -> Self {
        let subjects = subjects.into_iter().map(|s| (s.id, s)).collect();
        Self { metadata, subjects }
    }

    /// Returns the institution metadata.
    pub fn institution(&self) -> &InstitutionMetadata {
        &self.metadata
    }

    /// Returns every subject keyed by id.
    pub fn subjects(&self) -> &BTreeMap<SubjectId, Subject> {
        &self.subjects
    }

    /// Subjects belonging to a term, across all branches.
    pub fn subjects_in_term(&self, term_id: TermId) -> impl Iterator<Item = &Subject> {
        self.subjects.values().filter(move |s| s.term_id == term_id)
    }

    /// Subjects taught to one branch in one term.
    pub fn subjects_in_cohort(
        &self,
        branch_id: BranchId,
        term_id: TermId,
    ) -> impl Iterator<Item = &Subject> {
        self.subjects
            .values()
            .filter(move |s| s.belongs_to(branch_id, term_id))
    }
}
