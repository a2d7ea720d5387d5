//! Grace marks ledger.
//!
//! Holds one [`GraceBudget`] per (student, term), each behind its own mutex.
//! `spend` checks and increments inside that mutex, so concurrent
//! resolutions for the same student and term cannot jointly overspend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::calculation::compute_grace_budget;
use crate::error::{EngineError, EngineResult};
use crate::models::{GraceBudget, Subject, TermId};

type BudgetKey = (String, TermId);

/// Per-(student, term) grace budgets.
#[derive(Debug, Default)]
pub struct GraceLedger {
    budgets: RwLock<HashMap<BudgetKey, Arc<Mutex<GraceBudget>>>>,
}

impl GraceLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the term's budget from its subjects and stores it.
    ///
    /// Creates the budget on first call. Later calls replace `total_grace`
    /// only, so recomputing never touches grace already spent. Subjects from
    /// other terms are ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use academic_engine::models::Subject;
    /// use academic_engine::registry::GraceLedger;
    ///
    /// let subjects: Vec<Subject> = (1..=5)
    ///     .map(|id| Subject {
    ///         id,
    ///         name: format!("Subject {id}"),
    ///         code: format!("S{id}"),
    ///         branch_id: 1,
    ///         term_id: 1,
    ///         max_marks: 100,
    ///     })
    ///     .collect();
    ///
    /// let ledger = GraceLedger::new();
    /// assert_eq!(ledger.compute_budget("stu_001", 1, &subjects).unwrap(), 5);
    /// assert_eq!(ledger.remaining("stu_001", 1).unwrap(), 5);
    /// ```
    pub fn compute_budget(
        &self,
        student_id: &str,
        term_id: TermId,
        subjects: &[Subject],
    ) -> EngineResult<u32> {
        let term_subjects: Vec<Subject> = subjects
            .iter()
            .filter(|s| s.term_id == term_id)
            .cloned()
            .collect();
        let total = compute_grace_budget(&term_subjects)?;
        self.set_total(student_id, term_id, total)?;
        Ok(total)
    }

    /// Creates the budget with `total_grace`, or replaces the total of an
    /// existing one.
    pub fn set_total(&self, student_id: &str, term_id: TermId, total_grace: u32) -> EngineResult<()> {
        let key = (student_id.to_string(), term_id);
        let entry = {
            let mut budgets = self.budgets.write();
            let existing = budgets.get(&key).cloned();
            match existing {
                Some(entry) => entry,
                None => {
                    budgets.insert(
                        key,
                        Arc::new(Mutex::new(GraceBudget::new(student_id, term_id, total_grace))),
                    );
                    info!(student_id, term_id, total_grace, "Grace budget created");
                    return Ok(());
                }
            }
        };

        let mut budget = entry.lock();
        let previous = budget.total_grace();
        budget.set_total(total_grace)?;
        if previous != total_grace {
            info!(
                student_id,
                term_id,
                previous,
                total_grace,
                used_grace = budget.used_grace(),
                "Grace budget recomputed"
            );
        }
        Ok(())
    }

    /// Returns true if a budget exists for the student and term.
    pub fn contains(&self, student_id: &str, term_id: TermId) -> bool {
        self.budgets
            .read()
            .contains_key(&(student_id.to_string(), term_id))
    }

    /// Returns a snapshot of the budget.
    pub fn budget(&self, student_id: &str, term_id: TermId) -> EngineResult<GraceBudget> {
        Ok(self.entry(student_id, term_id)?.lock().clone())
    }

    /// Grace still available: `total_grace - used_grace`.
    ///
    /// # Errors
    ///
    /// Returns `BudgetNotFound` if the budget was never initialised.
    pub fn remaining(&self, student_id: &str, term_id: TermId) -> EngineResult<u32> {
        Ok(self.entry(student_id, term_id)?.lock().remaining())
    }

    /// Spends `amount` grace marks, returning the new `used_grace`.
    ///
    /// The remaining-balance check and the increment run under the budget's
    /// mutex as one step.
    ///
    /// # Errors
    ///
    /// - `BudgetNotFound` if the budget was never initialised.
    /// - `InsufficientGrace` if `amount` exceeds the remaining balance; the
    ///   budget is left unchanged.
    pub fn spend(&self, student_id: &str, term_id: TermId, amount: u32) -> EngineResult<u32> {
        let entry = self.entry(student_id, term_id)?;
        let mut budget = entry.lock();
        match budget.try_spend(amount) {
            Ok(used_grace) => {
                debug!(
                    student_id,
                    term_id,
                    amount,
                    used_grace,
                    total_grace = budget.total_grace(),
                    "Grace spent"
                );
                Ok(used_grace)
            }
            Err(err) => {
                warn!(
                    student_id,
                    term_id,
                    amount,
                    remaining = budget.remaining(),
                    "Grace spend rejected"
                );
                Err(err)
            }
        }
    }

    /// Snapshots of every budget held for a student, ordered by term.
    pub fn budgets_for_student(&self, student_id: &str) -> Vec<GraceBudget> {
        let entries: Vec<Arc<Mutex<GraceBudget>>> = self
            .budgets
            .read()
            .iter()
            .filter(|((student, _), _)| student == student_id)
            .map(|(_, entry)| Arc::clone(entry))
            .collect();
        let mut budgets: Vec<GraceBudget> = entries.iter().map(|e| e.lock().clone()).collect();
        budgets.sort_by_key(|b| b.term_id);
        budgets
    }

    fn entry(&self, student_id: &str, term_id: TermId) -> EngineResult<Arc<Mutex<GraceBudget>>> {
        self.budgets
            .read()
            .get(&(student_id.to_string(), term_id))
            .cloned()
            .ok_or_else(|| EngineError::BudgetNotFound {
                student_id: student_id.to_string(),
                term_id,
            })
    }
}
