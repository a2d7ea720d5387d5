//! Recorded subject results.

use serde::{Deserialize, Serialize};

use super::{Grade, SubjectId};

/// The authoritative outcome for a (student, subject) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectResult {
    /// The student the result belongs to.
    pub student_id: String,
    /// The subject the result is for.
    pub subject_id: SubjectId,
    /// Overall marks, including any grace applied on a reappear.
    pub marks: u32,
    /// Letter grade for `marks`.
    pub grade: Grade,
}
