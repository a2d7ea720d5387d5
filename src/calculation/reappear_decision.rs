//! Reappear decision logic.
//!
//! This module decides the outcome of a retake: whether it passes outright,
//! passes with grace, or fails. It is pure; committing the grace spend and
//! the result write is done by [`crate::registry::ReappearResolver`].

use serde_json::json;

use super::{calculate_grade, grace_eligible_mark, passing_mark};
use crate::error::EngineResult;
use crate::models::{AuditStep, Grade, ReappearStatus, Subject};

/// Rule identifier used in audit steps produced by this module.
pub const REAPPEAR_RULE_ID: &str = "reappear_resolution";

/// The decided outcome of a retake, before anything is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReappearDecision {
    /// `Passed` or `Failed`. Never `Pending`.
    pub status: ReappearStatus,
    /// The retake score as submitted.
    pub raw_score: u32,
    /// Marks to record: the raw score plus any grace used.
    pub final_marks: u32,
    /// Grace marks to spend. Non-zero only when the status is `Passed`.
    pub grace_used: u32,
    /// The subject's pass mark.
    pub passing_mark: u32,
    /// The subject's grace-eligible mark.
    pub grace_eligible_mark: u32,
    /// Grade for `final_marks`.
    pub grade: Grade,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Decides the outcome of a retake score.
///
/// 1. A score at or above the pass mark passes with no grace.
/// 2. A score in the grace band (at or above the grace-eligible mark) with
///    grace remaining is lifted by `min(needed, remaining)`. It passes only
///    if that closes the gap; otherwise it fails and no grace is used.
/// 3. Anything else fails.
///
/// # Arguments
///
/// * `subject` - The subject being retaken
/// * `score` - The raw retake score
/// * `remaining_grace` - Grace still available to the student this term
/// * `step_number` - The step number for audit trail sequencing
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::decide_reappear;
/// use academic_engine::models::{Grade, ReappearStatus, Subject};
///
/// let subject = Subject {
///     id: 101,
///     name: "Engineering Mathematics".to_string(),
///     code: "MA101".to_string(),
///     branch_id: 1,
///     term_id: 1,
///     max_marks: 100,
/// };
///
/// let decision = decide_reappear(&subject, 37, 3, 1).unwrap();
/// assert_eq!(decision.status, ReappearStatus::Passed);
/// assert_eq!(decision.grace_used, 3);
/// assert_eq!(decision.final_marks, 40);
/// assert_eq!(decision.grade, Grade::E);
///
/// let decision = decide_reappear(&subject, 37, 1, 1).unwrap();
/// assert_eq!(decision.status, ReappearStatus::Failed);
/// assert_eq!(decision.grace_used, 0);
/// assert_eq!(decision.final_marks, 37);
/// ```
pub fn decide_reappear(
    subject: &Subject,
    score: u32,
    remaining_grace: u32,
    step_number: u32,
) -> EngineResult<ReappearDecision> {
    let pass = passing_mark(subject.max_marks)?;
    let grace_floor = grace_eligible_mark(subject.max_marks)?;

    let (status, grace_used, reasoning) = if score >= pass {
        (
            ReappearStatus::Passed,
            0,
            format!("Score {score} meets pass mark {pass}; no grace needed"),
        )
    } else if score >= grace_floor && remaining_grace > 0 {
        let needed = pass - score;
        let applicable = needed.min(remaining_grace);
        if score + applicable >= pass {
            (
                ReappearStatus::Passed,
                applicable,
                format!(
                    "Score {score} is within grace band ({grace_floor}..{pass}); \
                     {applicable} grace of {remaining_grace} remaining lifts it to {pass}"
                ),
            )
        } else {
            (
                ReappearStatus::Failed,
                0,
                format!(
                    "Score {score} needs {needed} grace but only {remaining_grace} remains; \
                     no grace spent"
                ),
            )
        }
    } else if score >= grace_floor {
        (
            ReappearStatus::Failed,
            0,
            format!("Score {score} is within grace band but no grace remains"),
        )
    } else {
        (
            ReappearStatus::Failed,
            0,
            format!("Score {score} is below grace-eligible mark {grace_floor}"),
        )
    };

    let final_marks = score + grace_used;
    let grade = calculate_grade(final_marks, subject.max_marks)?;

    let audit_step = AuditStep {
        step_number,
        rule_id: REAPPEAR_RULE_ID.to_string(),
        rule_name: "Reappear Resolution".to_string(),
        input: json!({
            "subject_id": subject.id,
            "max_marks": subject.max_marks,
            "raw_score": score,
            "remaining_grace": remaining_grace
        }),
        output: json!({
            "status": status,
            "final_marks": final_marks,
            "grace_used": grace_used,
            "passing_mark": pass,
            "grace_eligible_mark": grace_floor,
            "grade": grade
        }),
        reasoning,
    };

    Ok(ReappearDecision {
        status,
        raw_score: score,
        final_marks,
        grace_used,
        passing_mark: pass,
        grace_eligible_mark: grace_floor,
        grade,
        audit_step,
    })
}
