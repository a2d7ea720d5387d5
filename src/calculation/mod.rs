//! Calculation logic for the Academic Engine.
//!
//! This module contains the pure decision functions: letter grade
//! calculation, pass and grace-eligibility thresholds, term grace budget
//! computation, the reappear decision, and exam overlap detection. None of
//! them touch shared state; the stateful side lives in [`crate::registry`].

mod exam_conflict;
mod grace_budget;
mod grade;
mod reappear_decision;
mod thresholds;

pub use exam_conflict::{conflicts, exams_overlap, find_conflict, intervals_overlap};
pub use grace_budget::{GRACE_BUDGET_FRACTION, compute_grace_budget};
pub use grade::{calculate_grade, percentage};
pub use reappear_decision::{REAPPEAR_RULE_ID, ReappearDecision, decide_reappear};
pub use thresholds::{
    GRACE_ELIGIBLE_FRACTION, PASS_FRACTION, grace_eligible_mark, passing_mark,
};
