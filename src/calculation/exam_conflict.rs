//! Exam scheduling conflict detection.
//!
//! Every overlap decision in the crate goes through [`intervals_overlap`],
//! the half-open test `a.start < b.end && b.start < a.end`. Exams that only
//! touch at a boundary (one ends at 09:50, the next starts at 09:50) do not
//! conflict.

use chrono::NaiveDateTime;

use crate::error::EngineResult;
use crate::models::ExamInterval;

/// Returns true if the half-open intervals `[a_start, a_end)` and
/// `[b_start, b_end)` share any instant.
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::intervals_overlap;
/// use chrono::NaiveDateTime;
///
/// let t = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
///
/// // back-to-back
/// assert!(!intervals_overlap(t("2026-03-02 09:00"), t("2026-03-02 09:50"), t("2026-03-02 09:50"), t("2026-03-02 10:40")));
/// // partial overlap
/// assert!(intervals_overlap(t("2026-03-02 09:00"), t("2026-03-02 09:50"), t("2026-03-02 09:30"), t("2026-03-02 10:00")));
/// ```
pub fn intervals_overlap(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Returns true if two exams are in the same (branch, term, date) scope and
/// their intervals overlap.
pub fn exams_overlap(a: &ExamInterval, b: &ExamInterval) -> bool {
    a.shares_slot_scope(b) && intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
}

/// Finds the first existing exam the candidate collides with.
///
/// Only exams sharing the candidate's branch, term and exam date are
/// considered. When re-validating an update, the caller must leave the exam
/// being updated out of `existing`.
///
/// # Errors
///
/// Returns `InvalidInput` when the candidate's end is not after its start.
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::find_conflict;
/// use academic_engine::models::ExamInterval;
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let exam = |id: &str, start: &str, end: &str| ExamInterval {
///     id: id.to_string(),
///     subject_id: 101,
///     branch_id: 1,
///     term_id: 1,
///     exam_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
///     start_time: NaiveDateTime::parse_from_str(&format!("2026-03-02 {start}"), "%Y-%m-%d %H:%M").unwrap(),
///     end_time: NaiveDateTime::parse_from_str(&format!("2026-03-02 {end}"), "%Y-%m-%d %H:%M").unwrap(),
/// };
///
/// let calendar = vec![exam("maths", "09:00", "09:50")];
///
/// assert!(find_conflict(&calendar, &exam("physics", "09:50", "10:40")).unwrap().is_none());
/// let hit = find_conflict(&calendar, &exam("physics", "08:00", "10:00")).unwrap();
/// assert_eq!(hit.map(|e| e.id.as_str()), Some("maths"));
/// ```
pub fn find_conflict<'a, I>(
    existing: I,
    candidate: &ExamInterval,
) -> EngineResult<Option<&'a ExamInterval>>
where
    I: IntoIterator<Item = &'a ExamInterval>,
{
    candidate.validate()?;
    Ok(existing
        .into_iter()
        .find(|exam| exams_overlap(exam, candidate)))
}

/// Boolean form of [`find_conflict`].
pub fn conflicts<'a, I>(existing: I, candidate: &ExamInterval) -> EngineResult<bool>
where
    I: IntoIterator<Item = &'a ExamInterval>,
{
    Ok(find_conflict(existing, candidate)?.is_some())
}
