//! Pass and grace-eligibility thresholds.
//!
//! Both thresholds are fixed fractions of a subject's maximum marks, rounded
//! up to the next whole mark.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{EngineError, EngineResult};

/// Fraction of maximum marks needed to pass (40%).
pub const PASS_FRACTION: Decimal = Decimal::from_parts(40, 0, 0, false, 2);

/// Fraction of maximum marks from which grace may be applied (35%).
pub const GRACE_ELIGIBLE_FRACTION: Decimal = Decimal::from_parts(35, 0, 0, false, 2);

/// The lowest passing mark: `ceil(max_marks * 0.40)`.
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::passing_mark;
///
/// assert_eq!(passing_mark(100).unwrap(), 40);
/// assert_eq!(passing_mark(75).unwrap(), 30);
/// assert_eq!(passing_mark(33).unwrap(), 14); // 13.2 rounds up
/// assert!(passing_mark(0).is_err());
/// ```
pub fn passing_mark(max_marks: u32) -> EngineResult<u32> {
    fraction_of_max(max_marks, PASS_FRACTION)
}

/// The lowest grace-eligible mark: `ceil(max_marks * 0.35)`.
///
/// # Examples
///
/// ```
/// use academic_engine::calculation::grace_eligible_mark;
///
/// assert_eq!(grace_eligible_mark(100).unwrap(), 35);
/// assert_eq!(grace_eligible_mark(50).unwrap(), 18); // 17.5 rounds up
/// ```
pub fn grace_eligible_mark(max_marks: u32) -> EngineResult<u32> {
    fraction_of_max(max_marks, GRACE_ELIGIBLE_FRACTION)
}

fn fraction_of_max(max_marks: u32, fraction: Decimal) -> EngineResult<u32> {
    if max_marks == 0 {
        return Err(EngineError::invalid_input(
            "max_marks",
            "maximum marks must be greater than zero",
        ));
    }
    // A u32 times a fraction below one always fits back into a u32.
    (Decimal::from(max_marks) * fraction)
        .ceil()
        .to_u32()
        .ok_or_else(|| {
            EngineError::invalid_input("max_marks", format!("{max_marks} is out of range"))
        })
}
