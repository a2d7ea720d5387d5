//! Letter grade calculation.
//!
//! Maps a score against a subject's maximum marks onto the seven-letter
//! scale. Percentages are computed with `Decimal` so boundary scores such as
//! 45 of 50 land exactly on 90%.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::Grade;

/// Lower percentage bound for each passing grade, best first.
const GRADE_BOUNDARIES: [(u32, Grade); 6] = [
    (90, Grade::APlus),
    (80, Grade::A),
    (70, Grade::B),
    (60, Grade::C),
    (50, Grade::D),
    (40, Grade::E),
];

/// Returns `marks` as a percentage of `max_marks`.
pub fn percentage(marks: u32, max_marks: u32) -> EngineResult<Decimal> {
    if max_marks == 0 {
        return Err(EngineError::invalid_input(
            "max_marks",
            "maximum marks must be greater than zero",
        ));
    }
    Ok(Decimal::from(marks) * Decimal::ONE_HUNDRED / Decimal::from(max_marks))
}

/// Calculates the letter grade for a score.
///
/// Thresholds are checked from the top and the first match wins:
/// 90% A+, 80% A, 70% B, 60% C, 50% D, 40% E, otherwise F.
///
/// # Errors
///
/// Returns `InvalidInput` when `max_marks` is zero.
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::calculate_grade;
/// use academic_engine::models::Grade;
///
/// assert_eq!(calculate_grade(45, 50).unwrap(), Grade::APlus);
/// assert_eq!(calculate_grade(40, 100).unwrap(), Grade::E);
/// assert_eq!(calculate_grade(39, 100).unwrap(), Grade::F);
/// assert!(calculate_grade(10, 0).is_err());
/// ```
pub fn calculate_grade(marks: u32, max_marks: u32) -> EngineResult<Grade> {
    let percent = percentage(marks, max_marks)?;
    let grade = GRADE_BOUNDARIES
        .iter()
        .find(|(bound, _)| percent >= Decimal::from(*bound))
        .map(|(_, grade)| *grade)
        .unwrap_or(Grade::F);
    Ok(grade)
}
