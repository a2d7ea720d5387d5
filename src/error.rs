//! Error types for the Academic Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while grading, resolving reappear
//! attempts, spending grace marks, and scheduling exams.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{ExamInterval, ReappearStatus, SubjectId, TermId};

/// The main error type for the Academic Engine.
///
/// Every failure in the engine is deterministic given the same inputs, so
/// none of these variants is retried internally. They surface synchronously
/// to the caller.
///
/// # Example
///
/// ```
/// use academic_engine::error::EngineError;
///
/// let error = EngineError::InsufficientGrace {
///     student_id: "stu_001".to_string(),
///     term_id: 3,
///     requested: 4,
///     remaining: 1,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Insufficient grace for student 'stu_001' in term 3: requested 4, remaining 1"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or contained invalid content.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An input value was malformed (zero maximum marks, inverted interval, ...).
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The field or argument that was invalid.
        field: String,
        /// A description of what made the input invalid.
        message: String,
    },

    /// Subject id was not found in the catalog.
    #[error("Subject not found: {subject_id}")]
    SubjectNotFound {
        /// The subject id that was not found.
        subject_id: SubjectId,
    },

    /// No grace budget has been initialised for the student and term.
    #[error("Grace budget not found for student '{student_id}' in term {term_id}")]
    BudgetNotFound {
        /// The student id.
        student_id: String,
        /// The term id.
        term_id: TermId,
    },

    /// Reappear attempt id was not found in the register.
    #[error("Reappear attempt not found: {attempt_id}")]
    AttemptNotFound {
        /// The attempt id that was not found.
        attempt_id: Uuid,
    },

    /// Exam id was not found in any cohort calendar.
    #[error("Exam not found: {exam_id}")]
    ExamNotFound {
        /// The exam id that was not found.
        exam_id: String,
    },

    /// A pending reappear attempt already exists for the student and subject.
    #[error(
        "Reappear attempt {attempt_id} is already pending for student '{student_id}' in subject {subject_id}"
    )]
    AttemptAlreadyOpen {
        /// The student id.
        student_id: String,
        /// The subject id.
        subject_id: SubjectId,
        /// The id of the attempt that is still pending.
        attempt_id: Uuid,
    },

    /// The reappear attempt has already reached a terminal state.
    #[error("Reappear attempt {attempt_id} is already resolved as {status}")]
    AlreadyResolved {
        /// The attempt id.
        attempt_id: Uuid,
        /// The terminal status the attempt holds.
        status: ReappearStatus,
    },

    /// The requested grace spend exceeds what is left in the budget.
    #[error(
        "Insufficient grace for student '{student_id}' in term {term_id}: requested {requested}, remaining {remaining}"
    )]
    InsufficientGrace {
        /// The student id.
        student_id: String,
        /// The term id.
        term_id: TermId,
        /// The grace amount that was requested.
        requested: u32,
        /// The grace amount that was still available.
        remaining: u32,
    },

    /// The candidate exam overlaps an exam already on the cohort's calendar.
    #[error("Exam '{exam_id}' conflicts with {conflicting}")]
    SchedulingConflict {
        /// The id of the exam that was being scheduled.
        exam_id: String,
        /// The committed exam it collides with.
        conflicting: Box<ExamInterval>,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Shorthand for building an [`EngineError::InvalidInput`].
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}
