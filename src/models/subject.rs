//! Subject model.
//!
//! A subject is a course offering within one term of one branch. Its maximum
//! marks drive grading, the pass and grace thresholds, and the term's grace
//! budget.

use serde::{Deserialize, Serialize};

use crate::calculation::{grace_eligible_mark, passing_mark};
use crate::error::{EngineError, EngineResult};

/// Identifier of a subject.
pub type SubjectId = u32;
/// Identifier of a branch (programme or stream).
pub type BranchId = u32;
/// Identifier of a term (semester).
pub type TermId = u32;

/// A course offering within a term.
///
/// # Example
///
/// ```
/// use academic_engine::models::Subject;
///
/// let subject = Subject {
///     id: 101,
///     name: "Engineering Mathematics".to_string(),
///     code: "MA101".to_string(),
///     branch_id: 1,
///     term_id: 1,
///     max_marks: 100,
/// };
/// assert_eq!(subject.passing_mark().unwrap(), 40);
/// assert_eq!(subject.grace_eligible_mark().unwrap(), 35);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier for the subject.
    pub id: SubjectId,
    /// Human-readable subject name.
    pub name: String,
    /// Short subject code (e.g., "MA101").
    pub code: String,
    /// The branch this subject is taught in.
    pub branch_id: BranchId,
    /// The term this subject belongs to.
    pub term_id: TermId,
    /// Maximum marks obtainable. Must be greater than zero.
    pub max_marks: u32,
}

impl Subject {
    /// Checks that the subject can be graded against.
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_marks == 0 {
            return Err(EngineError::invalid_input(
                "max_marks",
                format!("subject {} must have maximum marks greater than zero", self.id),
            ));
        }
        Ok(())
    }

    /// The lowest mark that passes this subject (40% of maximum, rounded up).
    pub fn passing_mark(&self) -> EngineResult<u32> {
        passing_mark(self.max_marks)
    }

    /// The lowest mark that may be lifted to a pass with grace (35% of maximum, rounded up).
    pub fn grace_eligible_mark(&self) -> EngineResult<u32> {
        grace_eligible_mark(self.max_marks)
    }

    /// Returns true if the subject is taught to the given cohort.
    pub fn belongs_to(&self, branch_id: BranchId, term_id: TermId) -> bool {
        self.branch_id == branch_id && self.term_id == term_id
    }
}
