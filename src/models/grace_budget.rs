//! Grace budget model.
//!
//! One [`GraceBudget`] exists per (student, term). The mutating methods here
//! are the only way `used_grace` changes, and each keeps
//! `used_grace <= total_grace`.

use serde::{Deserialize, Serialize};

use super::TermId;
use crate::error::{EngineError, EngineResult};

/// A student's grace-marks allowance for one term.
///
/// # Example
///
/// ```
/// use academic_engine::models::GraceBudget;
///
/// let mut budget = GraceBudget::new("stu_001", 1, 5);
/// assert_eq!(budget.try_spend(3).unwrap(), 3);
/// assert_eq!(budget.remaining(), 2);
/// assert!(budget.try_spend(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraceBudgetRecord")]
pub struct GraceBudget {
    /// The student this budget belongs to.
    pub student_id: String,
    /// The term this budget belongs to.
    pub term_id: TermId,
    /// Total grace marks available in the term.
    total_grace: u32,
    /// Grace marks already spent. Never decreases.
    used_grace: u32,
}

/// Unchecked wire form of [`GraceBudget`].
#[derive(Deserialize)]
struct GraceBudgetRecord {
    student_id: String,
    term_id: TermId,
    total_grace: u32,
    used_grace: u32,
}

impl TryFrom<GraceBudgetRecord> for GraceBudget {
    type Error = String;

    fn try_from(record: GraceBudgetRecord) -> Result<Self, Self::Error> {
        if record.used_grace > record.total_grace {
            return Err(format!(
                "used_grace {} exceeds total_grace {}",
                record.used_grace, record.total_grace
            ));
        }
        Ok(Self {
            student_id: record.student_id,
            term_id: record.term_id,
            total_grace: record.total_grace,
            used_grace: record.used_grace,
        })
    }
}

impl GraceBudget {
    /// Creates an unspent budget.
    pub fn new(student_id: impl Into<String>, term_id: TermId, total_grace: u32) -> Self {
        Self {
            student_id: student_id.into(),
            term_id,
            total_grace,
            used_grace: 0,
        }
    }

    /// Total grace marks available in the term.
    pub fn total_grace(&self) -> u32 {
        self.total_grace
    }

    /// Grace marks already spent.
    pub fn used_grace(&self) -> u32 {
        self.used_grace
    }

    /// Grace marks still available.
    pub fn remaining(&self) -> u32 {
        self.total_grace - self.used_grace
    }

    /// Spends `amount` grace marks if that many remain.
    ///
    /// The check and the increment happen on the same `&mut` borrow, so
    /// callers holding the budget's lock get a single conditional increment.
    /// Returns the new `used_grace`.
    pub fn try_spend(&mut self, amount: u32) -> EngineResult<u32> {
        let remaining = self.remaining();
        if amount > remaining {
            return Err(EngineError::InsufficientGrace {
                student_id: self.student_id.clone(),
                term_id: self.term_id,
                requested: amount,
                remaining,
            });
        }
        self.used_grace += amount;
        Ok(self.used_grace)
    }

    /// Replaces the total after the term's subject catalog changed.
    ///
    /// `used_grace` is left alone. A total below what has already been spent
    /// is rejected.
    pub fn set_total(&mut self, total_grace: u32) -> EngineResult<()> {
        if total_grace < self.used_grace {
            return Err(EngineError::invalid_input(
                "total_grace",
                format!(
                    "recomputed total {} is below the {} grace already spent by '{}' in term {}",
                    total_grace, self.used_grace, self.student_id, self.term_id
                ),
            ));
        }
        self.total_grace = total_grace;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_budget_is_unspent() {
        let budget = GraceBudget::new("stu_001", 1, 6);
        assert_eq!(budget.total_grace(), 6);
        assert_eq!(budget.used_grace(), 0);
        assert_eq!(budget.remaining(), 6);
    }

    #[test]
    fn test_spend_exact_remaining_succeeds() {
        let mut budget = GraceBudget::new("stu_001", 1, 4);
        assert_eq!(budget.try_spend(4).unwrap(), 4);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_overspend_leaves_budget_untouched() {
        let mut budget = GraceBudget::new("stu_001", 1, 4);
        budget.try_spend(3).unwrap();

        let err = budget.try_spend(2).unwrap_err();
        match err {
            EngineError::InsufficientGrace {
                requested,
                remaining,
                ..
            } => {
                assert_eq!(requested, 2);
                assert_eq!(remaining, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(budget.used_grace(), 3);
    }

    #[test]
    fn test_spend_zero_is_noop() {
        let mut budget = GraceBudget::new("stu_001", 1, 0);
        assert_eq!(budget.try_spend(0).unwrap(), 0);
    }

    #[test]
    fn test_set_total_keeps_used_grace() {
        let mut budget = GraceBudget::new("stu_001", 1, 5);
        budget.try_spend(2).unwrap();
        budget.set_total(8).unwrap();
        assert_eq!(budget.total_grace(), 8);
        assert_eq!(budget.used_grace(), 2);
    }

    #[test]
    fn test_set_total_below_used_is_rejected() {
        let mut budget = GraceBudget::new("stu_001", 1, 5);
        budget.try_spend(4).unwrap();
        assert!(matches!(
            budget.set_total(3),
            Err(EngineError::InvalidInput { .. })
        ));
        assert_eq!(budget.total_grace(), 5);
    }

    #[test]
    fn test_serde_keeps_both_counters() {
        let mut budget = GraceBudget::new("stu_001", 2, 7);
        budget.try_spend(1).unwrap();
        let json = serde_json::to_value(&budget).unwrap();
        assert_eq!(json["total_grace"], 7);
        assert_eq!(json["used_grace"], 1);

        let restored: GraceBudget = serde_json::from_value(json).unwrap();
        assert_eq!(restored, budget);
    }

    #[test]
    fn test_deserialize_rejects_overspent_record() {
        let json = r#"{"student_id":"stu_001","term_id":1,"total_grace":2,"used_grace":3}"#;
        assert!(serde_json::from_str::<GraceBudget>(json).is_err());
    }
}
