//! Result book: the recorded mark and grade per (student, subject).

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::models::{SubjectId, SubjectResult};

/// The authoritative results store.
#[derive(Debug, Default)]
pub struct ResultBook {
    results: RwLock<HashMap<(String, SubjectId), SubjectResult>>,
}

impl ResultBook {
    /// Creates an empty result book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a result, replacing any earlier one for the same pair.
    /// Returns the replaced result.
    pub fn record(&self, result: SubjectResult) -> Option<SubjectResult> {
        debug!(
            student_id = %result.student_id,
            subject_id = result.subject_id,
            marks = result.marks,
            grade = %result.grade,
            "Result recorded"
        );
        self.results
            .write()
            .insert((result.student_id.clone(), result.subject_id), result)
    }

    /// The current result for a student and subject.
    pub fn get(&self, student_id: &str, subject_id: SubjectId) -> Option<SubjectResult> {
        self.results
            .read()
            .get(&(student_id.to_string(), subject_id))
            .cloned()
    }

    /// All results for a student, ordered by subject.
    pub fn for_student(&self, student_id: &str) -> Vec<SubjectResult> {
        let mut results: Vec<SubjectResult> = self
            .results
            .read()
            .values()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        results.sort_by_key(|r| r.subject_id);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Grade;

    fn make_result(student_id: &str, subject_id: SubjectId, marks: u32, grade: Grade) -> SubjectResult {
        SubjectResult {
            student_id: student_id.to_string(),
            subject_id,
            marks,
            grade,
        }
    }

    #[test]
    fn test_record_overwrites_previous_result() {
        let book = ResultBook::new();
        assert!(book.record(make_result("stu_001", 101, 30, Grade::F)).is_none());

        let replaced = book.record(make_result("stu_001", 101, 40, Grade::E));
        assert_eq!(replaced.map(|r| r.marks), Some(30));
        assert_eq!(book.get("stu_001", 101).unwrap().grade, Grade::E);
    }

    #[test]
    fn test_for_student_is_ordered_and_scoped() {
        let book = ResultBook::new();
        book.record(make_result("stu_001", 103, 70, Grade::B));
        book.record(make_result("stu_001", 101, 90, Grade::APlus));
        book.record(make_result("stu_002", 102, 55, Grade::D));

        let subjects: Vec<SubjectId> = book
            .for_student("stu_001")
            .iter()
            .map(|r| r.subject_id)
            .collect();
        assert_eq!(subjects, vec![101, 103]);
        assert!(book.get("stu_002", 101).is_none());
    }
}
