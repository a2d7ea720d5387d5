//! Exam interval model and related types.
//!
//! This module defines [`ExamInterval`], a scheduled exam sitting for one
//! cohort, and [`ExamProposal`], the (date, start, duration) form in which
//! exams are usually proposed.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{BranchId, SubjectId, TermId};
use crate::error::{EngineError, EngineResult};

/// The (branch, term) scope within which exams may not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cohort {
    /// The branch id.
    pub branch_id: BranchId,
    /// The term id.
    pub term_id: TermId,
}

impl Cohort {
    /// Creates a cohort.
    pub fn new(branch_id: BranchId, term_id: TermId) -> Self {
        Self { branch_id, term_id }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch {} term {}", self.branch_id, self.term_id)
    }
}

/// A scheduled exam for a cohort.
///
/// The interval is half-open: an exam ending at 09:50 and another starting
/// at 09:50 do not overlap.
///
/// # Examples
///
/// ```
/// use academic_engine::models::ExamInterval;
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let exam = ExamInterval {
///     id: "exam_001".to_string(),
///     subject_id: 101,
///     branch_id: 1,
///     term_id: 1,
///     exam_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     start_time: NaiveDateTime::parse_from_str("2026-03-02 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
///     end_time: NaiveDateTime::parse_from_str("2026-03-02 09:50:00", "%Y-%m-%d %H:%M:%S").unwrap(),
/// };
/// assert!(exam.validate().is_ok());
/// assert_eq!(exam.duration_minutes(), 50);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamInterval {
    /// Unique identifier for the exam.
    pub id: String,
    /// The subject examined.
    pub subject_id: SubjectId,
    /// The branch sitting the exam.
    pub branch_id: BranchId,
    /// The term the exam belongs to.
    pub term_id: TermId,
    /// The calendar date of the exam.
    pub exam_date: NaiveDate,
    /// When the exam starts.
    pub start_time: NaiveDateTime,
    /// When the exam ends. Must be after `start_time`.
    pub end_time: NaiveDateTime,
}

impl ExamInterval {
    /// The cohort this exam belongs to.
    pub fn cohort(&self) -> Cohort {
        Cohort::new(self.branch_id, self.term_id)
    }

    /// Length of the exam in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// Returns true if both exams are checked against each other: same
    /// branch, term and exam date.
    pub fn shares_slot_scope(&self, other: &ExamInterval) -> bool {
        self.branch_id == other.branch_id
            && self.term_id == other.term_id
            && self.exam_date == other.exam_date
    }

    /// Rejects a blank id, an `exam_date` that is not the start's calendar
    /// date, and intervals whose end is not after their start.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::invalid_input("id", "exam id must not be empty"));
        }
        if self.start_time.date() != self.exam_date {
            return Err(EngineError::invalid_input(
                "exam_date",
                format!(
                    "exam '{}' is dated {} but starts at {}",
                    self.id, self.exam_date, self.start_time
                ),
            ));
        }
        if self.end_time <= self.start_time {
            return Err(EngineError::invalid_input(
                "end_time",
                format!(
                    "exam '{}' ends at {} which is not after its start {}",
                    self.id, self.end_time, self.start_time
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ExamInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exam '{}' (subject {}) on {} {}-{}",
            self.id,
            self.subject_id,
            self.exam_date,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// An exam proposed by start time and duration.
///
/// The end time is derived, so sittings are always one of the institution's
/// standard lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamProposal {
    /// Unique identifier for the exam.
    pub id: String,
    /// The subject examined.
    pub subject_id: SubjectId,
    /// The branch sitting the exam.
    pub branch_id: BranchId,
    /// The term the exam belongs to.
    pub term_id: TermId,
    /// The calendar date of the exam.
    pub exam_date: NaiveDate,
    /// Start time on `exam_date`.
    pub start: NaiveTime,
    /// Sitting length in minutes.
    pub duration_minutes: u32,
}

impl ExamProposal {
    /// Builds the concrete interval for this proposal.
    pub fn to_interval(&self) -> EngineResult<ExamInterval> {
        if self.duration_minutes == 0 {
            return Err(EngineError::invalid_input(
                "duration_minutes",
                "exam duration must be greater than zero",
            ));
        }
        let start_time = self.exam_date.and_time(self.start);
        let end_time = start_time + Duration::minutes(i64::from(self.duration_minutes));
        Ok(ExamInterval {
            id: self.id.clone(),
            subject_id: self.subject_id,
            branch_id: self.branch_id,
            term_id: self.term_id,
            exam_date: self.exam_date,
            start_time,
            end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
            .unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn make_exam(start: &str, end: &str) -> ExamInterval {
        ExamInterval {
            id: "EX-001".to_string(),
            subject_id: 101,
            branch_id: 1,
            term_id: 1,
            exam_date: make_date("2026-03-02"),
            start_time: make_datetime("2026-03-02", start),
            end_time: make_datetime("2026-03-02", end),
        }
    }

    #[test]
    fn test_valid_interval() {
        let exam = make_exam("09:00:00", "10:30:00");
        assert!(exam.validate().is_ok());
        assert_eq!(exam.duration_minutes(), 90);
    }

    #[test]
    fn test_zero_length_interval_is_invalid() {
        let exam = make_exam("09:00:00", "09:00:00");
        assert!(matches!(
            exam.validate(),
            Err(EngineError::InvalidInput { ref field, .. }) if field == "end_time"
        ));
    }

    #[test]
    fn test_inverted_interval_is_invalid() {
        let exam = make_exam("10:00:00", "09:00:00");
        assert!(exam.validate().is_err());
    }

    #[test]
    fn test_blank_id_is_invalid() {
        let mut exam = make_exam("09:00:00", "09:50:00");
        exam.id = "  ".to_string();
        assert!(matches!(
            exam.validate(),
            Err(EngineError::InvalidInput { ref field, .. }) if field == "id"
        ));
    }

    #[test]
    fn test_exam_date_must_match_start_date() {
        let mut exam = make_exam("09:00:00", "09:50:00");
        exam.exam_date = make_date("2026-03-03");
        assert!(matches!(
            exam.validate(),
            Err(EngineError::InvalidInput { ref field, .. }) if field == "exam_date"
        ));
    }

    #[test]
    fn test_shares_slot_scope_requires_same_date() {
        let a = make_exam("09:00:00", "09:50:00");
        let mut b = a.clone();
        assert!(a.shares_slot_scope(&b));

        b.exam_date = make_date("2026-03-03");
        assert!(!a.shares_slot_scope(&b));

        let mut c = a.clone();
        c.branch_id = 2;
        assert!(!a.shares_slot_scope(&c));
    }

    #[test]
    fn test_proposal_derives_end_time() {
        let proposal = ExamProposal {
            id: "EX-002".to_string(),
            subject_id: 101,
            branch_id: 1,
            term_id: 1,
            exam_date: make_date("2026-03-02"),
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration_minutes: 50,
        };
        let exam = proposal.to_interval().unwrap();
        assert_eq!(exam.start_time, make_datetime("2026-03-02", "09:00:00"));
        assert_eq!(exam.end_time, make_datetime("2026-03-02", "09:50:00"));
        assert_eq!(exam.cohort(), Cohort::new(1, 1));
    }

    #[test]
    fn test_proposal_with_zero_duration_is_rejected() {
        let proposal = ExamProposal {
            id: "EX-003".to_string(),
            subject_id: 101,
            branch_id: 1,
            term_id: 1,
            exam_date: make_date("2026-03-02"),
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration_minutes: 0,
        };
        assert!(proposal.to_interval().is_err());
    }

    #[test]
    fn test_display_uses_clock_times() {
        let exam = make_exam("09:00:00", "09:50:00");
        assert_eq!(
            exam.to_string(),
            "exam 'EX-001' (subject 101) on 2026-03-02 09:00-09:50"
        );
    }
}
