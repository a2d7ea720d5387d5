//! Reappear resolution.
//!
//! The resolver runs the `Pending -> {Passed, Failed}` transition. Under
//! the attempt's mutex it reads the remaining grace, decides the outcome,
//! spends grace, writes the result, and only then marks the attempt
//! terminal. A failed spend aborts the whole resolution and leaves the
//! attempt Pending.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::{GraceLedger, ReappearRegister, ResultBook};
use crate::calculation::decide_reappear;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, Grade, ReappearAttempt, ReappearStatus, Subject, SubjectId, SubjectResult,
    TermId,
};

/// Everything a resolution decided and committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReappearOutcome {
    /// Unique identifier for this resolution.
    pub resolution_id: Uuid,
    /// The attempt that was resolved.
    pub attempt_id: Uuid,
    /// The student.
    pub student_id: String,
    /// The subject retaken.
    pub subject_id: SubjectId,
    /// The term whose budget was consulted.
    pub term_id: TermId,
    /// Terminal status of the attempt.
    pub status: ReappearStatus,
    /// The retake score as submitted.
    pub raw_score: u32,
    /// The raw score plus any grace used.
    pub final_marks: u32,
    /// Grace marks spent by this resolution.
    pub grace_used: u32,
    /// Grade for `final_marks`.
    pub grade: Grade,
    /// The result written to the result book, on a pass.
    pub recorded_result: Option<SubjectResult>,
    /// Audit trail of the decision.
    pub audit_steps: Vec<AuditStep>,
}

/// Resolves pending reappear attempts against the ledger and result book.
#[derive(Debug, Clone, Copy)]
pub struct ReappearResolver<'a> {
    ledger: &'a GraceLedger,
    register: &'a ReappearRegister,
    results: &'a ResultBook,
}

impl<'a> ReappearResolver<'a> {
    /// Creates a resolver over the given stores.
    pub fn new(
        ledger: &'a GraceLedger,
        register: &'a ReappearRegister,
        results: &'a ResultBook,
    ) -> Self {
        Self {
            ledger,
            register,
            results,
        }
    }

    /// Resolves a pending attempt with its retake score.
    ///
    /// # Arguments
    ///
    /// * `attempt_id` - The pending attempt
    /// * `subject` - The subject the attempt is for (thresholds come from it)
    /// * `score` - The raw retake score
    ///
    /// # Errors
    ///
    /// - `AttemptNotFound` for an unknown attempt.
    /// - `AlreadyResolved` if the attempt is terminal; nothing is changed.
    /// - `InvalidInput` for zero maximum marks or a subject that does not
    ///   match the attempt.
    /// - `BudgetNotFound` if the score is in the grace band and the student
    ///   has no budget for the term.
    /// - `InsufficientGrace` if a concurrent spend drained the budget after
    ///   it was read; the attempt stays Pending.
    ///
    /// # Example
    ///
    /// ```
    /// use academic_engine::models::{Grade, ReappearStatus, Subject};
    /// use academic_engine::registry::{GraceLedger, ReappearRegister, ReappearResolver, ResultBook};
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
    /// let ledger = GraceLedger::new();
    /// let register = ReappearRegister::new();
    /// let results = ResultBook::new();
    /// ledger.set_total("stu_001", 1, 3).unwrap();
    /// let attempt = register.open("stu_001", 101, 1).unwrap();
    ///
    /// let resolver = ReappearResolver::new(&ledger, &register, &results);
    /// let outcome = resolver.resolve(attempt.id, &subject, 37).unwrap();
    ///
    /// assert_eq!(outcome.status, ReappearStatus::Passed);
    /// assert_eq!(outcome.final_marks, 40);
    /// assert_eq!(results.get("stu_001", 101).unwrap().grade, Grade::E);
    /// assert_eq!(ledger.remaining("stu_001", 1).unwrap(), 0);
    /// ```
    pub fn resolve(
        &self,
        attempt_id: Uuid,
        subject: &Subject,
        score: u32,
    ) -> EngineResult<ReappearOutcome> {
        self.resolve_against(attempt_id, subject, score, |attempt| {
            self.ledger.remaining(&attempt.student_id, attempt.term_id)
        })
    }

    /// Runs a resolution with `remaining_grace` supplying the balance the
    /// decision is made against. It is only called for scores in the grace
    /// band, under the attempt's mutex.
    fn resolve_against<R>(
        &self,
        attempt_id: Uuid,
        subject: &Subject,
        score: u32,
        remaining_grace: R,
    ) -> EngineResult<ReappearOutcome>
    where
        R: FnOnce(&ReappearAttempt) -> EngineResult<u32>,
    {
        subject.validate()?;

        let outcome = self.register.resolve_with(attempt_id, score, |attempt| {
            if attempt.subject_id != subject.id {
                return Err(EngineError::invalid_input(
                    "subject",
                    format!(
                        "attempt {} is for subject {}, not {}",
                        attempt.id, attempt.subject_id, subject.id
                    ),
                ));
            }

            let passing = subject.passing_mark()?;
            let grace_floor = subject.grace_eligible_mark()?;
            let in_grace_band = score < passing && score >= grace_floor;
            let remaining = if in_grace_band {
                remaining_grace(attempt)?
            } else {
                0
            };

            let decision = decide_reappear(subject, score, remaining, 1)?;
            let mut audit_steps = vec![decision.audit_step.clone()];

            if decision.grace_used > 0 {
                let used_grace = self
                    .ledger
                    .spend(&attempt.student_id, attempt.term_id, decision.grace_used)
                    .inspect_err(|_| {
                        warn!(
                            attempt_id = %attempt.id,
                            student_id = %attempt.student_id,
                            requested = decision.grace_used,
                            "Grace spend failed; attempt left pending"
                        );
                    })?;
                audit_steps.push(AuditStep {
                    step_number: 2,
                    rule_id: "grace_spend".to_string(),
                    rule_name: "Grace Spend".to_string(),
                    input: json!({
                        "term_id": attempt.term_id,
                        "amount": decision.grace_used
                    }),
                    output: json!({ "used_grace": used_grace }),
                    reasoning: format!(
                        "Spent {} grace from the term budget; {} now used",
                        decision.grace_used, used_grace
                    ),
                });
            }

            let recorded_result = (decision.status == ReappearStatus::Passed).then(|| {
                let result = SubjectResult {
                    student_id: attempt.student_id.clone(),
                    subject_id: subject.id,
                    marks: decision.final_marks,
                    grade: decision.grade,
                };
                self.results.record(result.clone());
                result
            });

            let outcome = ReappearOutcome {
                resolution_id: Uuid::new_v4(),
                attempt_id: attempt.id,
                student_id: attempt.student_id.clone(),
                subject_id: attempt.subject_id,
                term_id: attempt.term_id,
                status: decision.status,
                raw_score: score,
                final_marks: decision.final_marks,
                grace_used: decision.grace_used,
                grade: decision.grade,
                recorded_result,
                audit_steps,
            };
            Ok((decision.status, outcome))
        })?;

        info!(
            attempt_id = %outcome.attempt_id,
            resolution_id = %outcome.resolution_id,
            student_id = %outcome.student_id,
            subject_id = outcome.subject_id,
            status = %outcome.status,
            raw_score = outcome.raw_score,
            final_marks = outcome.final_marks,
            grace_used = outcome.grace_used,
            "Reappear attempt resolved"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    fn make_subject(id: SubjectId, max_marks: u32) -> Subject {
        Subject {
            id,
            name: format!("Subject {id}"),
            code: format!("S{id:03}"),
            branch_id: 1,
            term_id: 1,
            max_marks,
        }
    }

    struct Fixture {
        ledger: GraceLedger,
        register: ReappearRegister,
        results: ResultBook,
    }

    impl Fixture {
        fn with_grace(total: u32) -> Self {
            let fixture = Self {
                ledger: GraceLedger::new(),
                register: ReappearRegister::new(),
                results: ResultBook::new(),
            };
            fixture.ledger.set_total("stu_001", 1, total).unwrap();
            fixture
        }

        fn resolver(&self) -> ReappearResolver<'_> {
            ReappearResolver::new(&self.ledger, &self.register, &self.results)
        }

        fn failing_result(&self, subject_id: SubjectId, marks: u32) -> Uuid {
            self.results.record(SubjectResult {
                student_id: "stu_001".to_string(),
                subject_id,
                marks,
                grade: Grade::F,
            });
            self.register.open("stu_001", subject_id, 1).unwrap().id
        }
    }

    #[test]
    fn test_grace_pass_commits_everything() {
        let fx = Fixture::with_grace(3);
        let attempt_id = fx.failing_result(101, 20);

        let outcome = fx.resolver().resolve(attempt_id, &make_subject(101, 100), 37).unwrap();

        assert_eq!(outcome.status, ReappearStatus::Passed);
        assert_eq!(outcome.grace_used, 3);
        assert_eq!(outcome.final_marks, 40);
        assert_eq!(outcome.grade, Grade::E);
        assert_eq!(outcome.audit_steps.len(), 2);
        assert_eq!(outcome.audit_steps[1].rule_id, "grace_spend");

        let result = fx.results.get("stu_001", 101).unwrap();
        assert_eq!(result.marks, 40);
        assert_eq!(result.grade, Grade::E);
        assert_eq!(fx.ledger.remaining("stu_001", 1).unwrap(), 0);

        let attempt = fx.register.get(attempt_id).unwrap();
        assert_eq!(attempt.status, ReappearStatus::Passed);
        assert_eq!(attempt.retake_score, Some(37));
    }

    #[test]
    fn test_insufficient_grace_fails_and_keeps_old_result() {
        let fx = Fixture::with_grace(1);
        let attempt_id = fx.failing_result(101, 20);

        let outcome = fx.resolver().resolve(attempt_id, &make_subject(101, 100), 37).unwrap();

        assert_eq!(outcome.status, ReappearStatus::Failed);
        assert_eq!(outcome.grace_used, 0);
        assert_eq!(outcome.final_marks, 37);
        assert!(outcome.recorded_result.is_none());
        assert_eq!(fx.results.get("stu_001", 101).unwrap().marks, 20);
        assert_eq!(fx.ledger.remaining("stu_001", 1).unwrap(), 1);
        assert_eq!(
            fx.register.get(attempt_id).unwrap().status,
            ReappearStatus::Failed
        );
    }

    #[test]
    fn test_no_grace_left_fails_at_39() {
        let fx = Fixture::with_grace(0);
        let attempt_id = fx.failing_result(101, 20);
        let outcome = fx.resolver().resolve(attempt_id, &make_subject(101, 100), 39).unwrap();
        assert_eq!(outcome.status, ReappearStatus::Failed);
        assert_eq!(outcome.final_marks, 39);
    }

    #[test]
    fn test_clean_pass_overwrites_result_without_grace() {
        let fx = Fixture::with_grace(5);
        let attempt_id = fx.failing_result(101, 20);
        let outcome = fx.resolver().resolve(attempt_id, &make_subject(101, 100), 72).unwrap();
        assert_eq!(outcome.grade, Grade::B);
        assert_eq!(fx.results.get("stu_001", 101).unwrap().marks, 72);
        assert_eq!(fx.ledger.remaining("stu_001", 1).unwrap(), 5);
    }

    #[test]
    fn test_second_resolution_is_rejected_and_changes_nothing() {
        let fx = Fixture::with_grace(6);
        let attempt_id = fx.failing_result(101, 20);
        let subject = make_subject(101, 100);
        fx.resolver().resolve(attempt_id, &subject, 37).unwrap();

        let err = fx.resolver().resolve(attempt_id, &subject, 90).unwrap_err();
        assert!(matches!(
            err,
            EngineError::AlreadyResolved {
                status: ReappearStatus::Passed,
                ..
            }
        ));
        assert_eq!(fx.results.get("stu_001", 101).unwrap().marks, 40);
        assert_eq!(fx.ledger.remaining("stu_001", 1).unwrap(), 3);
    }

    #[test]
    fn test_spend_failure_after_read_leaves_attempt_pending_and_result_unchanged() {
        let fx = Fixture::with_grace(3);
        let attempt_id = fx.failing_result(101, 20);

        // the balance is read as 3, then another resolution drains it before
        // the spend runs
        let err = fx
            .resolver()
            .resolve_against(attempt_id, &make_subject(101, 100), 37, |attempt| {
                let remaining = fx.ledger.remaining(&attempt.student_id, attempt.term_id)?;
                fx.ledger.spend(&attempt.student_id, attempt.term_id, remaining)?;
                Ok(remaining)
            })
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::InsufficientGrace {
                requested: 3,
                remaining: 0,
                ..
            }
        ));
        let attempt = fx.register.get(attempt_id).unwrap();
        assert!(attempt.is_pending());
        assert!(attempt.retake_score.is_none());
        assert_eq!(fx.results.get("stu_001", 101).unwrap().marks, 20);
        assert_eq!(fx.results.get("stu_001", 101).unwrap().grade, Grade::F);
        assert_eq!(fx.ledger.budget("stu_001", 1).unwrap().used_grace(), 3);
        assert!(fx.register.pending_for("stu_001", 101).is_some());

        // once the budget is known to be empty the retry fails cleanly
        let outcome = fx.resolver().resolve(attempt_id, &make_subject(101, 100), 37).unwrap();
        assert_eq!(outcome.status, ReappearStatus::Failed);
        assert_eq!(fx.results.get("stu_001", 101).unwrap().marks, 20);
    }

    #[test]
    fn test_missing_budget_in_grace_band_leaves_attempt_pending() {
        let fx = Fixture {
            ledger: GraceLedger::new(),
            register: ReappearRegister::new(),
            results: ResultBook::new(),
        };
        let attempt_id = fx.failing_result(101, 20);
        let err = fx
            .resolver()
            .resolve(attempt_id, &make_subject(101, 100), 36)
            .unwrap_err();
        assert!(matches!(err, EngineError::BudgetNotFound { .. }));
        assert!(fx.register.get(attempt_id).unwrap().is_pending());
    }

    #[test]
    fn test_missing_budget_outside_grace_band_is_fine() {
        let fx = Fixture {
            ledger: GraceLedger::new(),
            register: ReappearRegister::new(),
            results: ResultBook::new(),
        };
        let attempt_id = fx.failing_result(101, 20);
        let outcome = fx
            .resolver()
            .resolve(attempt_id, &make_subject(101, 100), 12)
            .unwrap();
        assert_eq!(outcome.status, ReappearStatus::Failed);
    }

    #[test]
    fn test_mismatched_subject_is_rejected() {
        let fx = Fixture::with_grace(3);
        let attempt_id = fx.failing_result(101, 20);
        let err = fx
            .resolver()
            .resolve(attempt_id, &make_subject(202, 100), 50)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert!(fx.register.get(attempt_id).unwrap().is_pending());
    }

    #[test]
    fn test_zero_max_marks_is_rejected_before_touching_attempt() {
        let fx = Fixture::with_grace(3);
        let attempt_id = fx.failing_result(101, 20);
        let err = fx
            .resolver()
            .resolve(attempt_id, &make_subject(101, 0), 50)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
        assert!(fx.register.get(attempt_id).unwrap().is_pending());
    }

    #[test]
    fn test_concurrent_resolutions_share_budget_without_overspending() {
        // Budget 4; two subjects each need 3 grace. Only one can pass.
        for _ in 0..50 {
            let fx = Fixture::with_grace(4);
            let first_id = fx.failing_result(101, 10);
            let second_id = fx.failing_result(102, 10);
            let first_subject = make_subject(101, 100);
            let second_subject = make_subject(102, 100);
            let barrier = Barrier::new(2);

            let (a, b) = thread::scope(|scope| {
                let first = scope.spawn(|| {
                    barrier.wait();
                    fx.resolver().resolve(first_id, &first_subject, 37)
                });
                let second = scope.spawn(|| {
                    barrier.wait();
                    fx.resolver().resolve(second_id, &second_subject, 37)
                });
                (first.join().unwrap(), second.join().unwrap())
            });

            let graced = [&a, &b]
                .iter()
                .filter(|r| matches!(r, Ok(o) if o.grace_used == 3))
                .count();
            assert_eq!(graced, 1);
            let budget = fx.ledger.budget("stu_001", 1).unwrap();
            assert_eq!(budget.used_grace(), 3);

            // the other either saw 1 remaining and failed, or lost the spend race
            // and stayed pending
            for (result, id) in [(&a, first_id), (&b, second_id)] {
                match result {
                    Ok(outcome) if outcome.grace_used == 3 => {}
                    Ok(outcome) => assert_eq!(outcome.status, ReappearStatus::Failed),
                    Err(err) => {
                        assert!(matches!(err, EngineError::InsufficientGrace { .. }));
                        assert!(fx.register.get(id).unwrap().is_pending());
                    }
                }
            }
        }
    }
}
