//! Term grace budget calculation.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{EngineError, EngineResult};
use crate::models::Subject;

/// Fraction of a term's total maximum marks granted as grace (1%).
pub const GRACE_BUDGET_FRACTION: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Computes the grace budget for a term: 1% of the summed maximum marks of
/// its subjects, rounded down.
///
/// The caller passes the term's subjects; subjects from other terms must be
/// filtered out beforehand.
///
/// # Errors
///
/// Returns `InvalidInput` on `max_marks` if the budget does not fit in a
/// `u32`.
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::compute_grace_budget;
/// use academic_engine::models::Subject;
///
/// let subject = |id, max_marks| Subject {
///     id,
///     name: format!("Subject {id}"),
///     code: format!("S{id}"),
///     branch_id: 1,
///     term_id: 1,
///     max_marks,
/// };
///
/// // 100 + 100 + 100 + 50 + 75 = 425 -> 4.25 -> 4
/// let subjects = vec![subject(1, 100), subject(2, 100), subject(3, 100), subject(4, 50), subject(5, 75)];
/// assert_eq!(compute_grace_budget(&subjects).unwrap(), 4);
/// ```
pub fn compute_grace_budget(subjects: &[Subject]) -> EngineResult<u32> {
    let total_max_marks: u64 = subjects.iter().map(|s| u64::from(s.max_marks)).sum();
    (Decimal::from(total_max_marks) * GRACE_BUDGET_FRACTION)
        .floor()
        .to_u32()
        .ok_or_else(|| {
            EngineError::invalid_input(
                "max_marks",
                format!("term total of {total_max_marks} marks gives a grace budget out of range"),
            )
        })
}
