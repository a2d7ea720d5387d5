//! Reappear attempt model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SubjectId, TermId};

/// Status of a reappear attempt.
///
/// `Pending` moves to exactly one of the terminal states, once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReappearStatus {
    /// Awaiting a retake score.
    Pending,
    /// The retake (possibly with grace) reached the pass mark.
    Passed,
    /// The retake did not reach the pass mark.
    Failed,
}

impl ReappearStatus {
    /// Returns true for `Passed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReappearStatus::Pending)
    }
}

impl fmt::Display for ReappearStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReappearStatus::Pending => "Pending",
            ReappearStatus::Passed => "Passed",
            ReappearStatus::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// One subject a student must retake.
///
/// # Example
///
/// ```
/// use academic_engine::models::{ReappearAttempt, ReappearStatus};
///
/// let attempt = ReappearAttempt::new("stu_001", 101, 1);
/// assert_eq!(attempt.status, ReappearStatus::Pending);
/// assert!(attempt.retake_score.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReappearAttempt {
    /// Unique identifier for the attempt.
    pub id: Uuid,
    /// The student retaking the subject.
    pub student_id: String,
    /// The subject being retaken.
    pub subject_id: SubjectId,
    /// The term whose grace budget the attempt draws on.
    pub term_id: TermId,
    /// Current status.
    pub status: ReappearStatus,
    /// Raw retake score, set once on resolution.
    pub retake_score: Option<u32>,
}

impl ReappearAttempt {
    /// Opens a new pending attempt.
    pub fn new(student_id: impl Into<String>, subject_id: SubjectId, term_id: TermId) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: student_id.into(),
            subject_id,
            term_id,
            status: ReappearStatus::Pending,
            retake_score: None,
        }
    }

    /// Returns true while the attempt awaits a retake score.
    pub fn is_pending(&self) -> bool {
        self.status == ReappearStatus::Pending
    }
}
