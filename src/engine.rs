//! The engine facade.
//!
//! [`AcademicEngine`] wires the subject catalog to the grace ledger, the
//! reappear register, the result book and the exam calendar. It is cheap to
//! clone and every clone shares the same stores, so a host can hand one to
//! each worker thread.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::calculate_grade;
use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    BranchId, Cohort, ExamInterval, ExamProposal, GraceBudget, ReappearAttempt, Subject,
    SubjectId, SubjectResult, TermId,
};
use crate::registry::{
    ExamCalendar, GraceLedger, ReappearOutcome, ReappearRegister, ReappearResolver, ResultBook,
};

/// A graded result plus the reappear attempt it left open, if it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedResult {
    /// The result as written.
    pub result: SubjectResult,
    /// The Pending attempt for this subject when the mark is below the pass
    /// mark. An attempt that was already pending is returned as is.
    pub reappear: Option<ReappearAttempt>,
}

/// Shared engine state.
///
/// # Example
///
/// ```no_run
/// use academic_engine::config::ConfigLoader;
/// use academic_engine::engine::AcademicEngine;
///
/// let engine = AcademicEngine::new(ConfigLoader::load("./config/sample")?);
/// engine.enroll_student("stu_001", 1, 1)?;
///
/// let recorded = engine.record_result("stu_001", 101, 22)?;
/// let attempt = recorded.reappear.expect("a failing mark opens a reappear");
///
/// let outcome = engine.resolve_reappear(attempt.id, 37)?;
/// println!("{} -> {} ({})", outcome.raw_score, outcome.final_marks, outcome.grade);
/// # Ok::<(), academic_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AcademicEngine {
    config: Arc<ConfigLoader>,
    ledger: Arc<GraceLedger>,
    register: Arc<ReappearRegister>,
    results: Arc<ResultBook>,
    calendar: Arc<ExamCalendar>,
}

impl AcademicEngine {
    /// Creates an engine over the given catalog with empty stores.
    pub fn new(config: ConfigLoader) -> Self {
        info!(
            institution = %config.institution().code,
            source = %config.source(),
            subjects = config.config().subjects().len(),
            "Academic engine initialised"
        );
        Self {
            config: Arc::new(config),
            ledger: Arc::new(GraceLedger::new()),
            register: Arc::new(ReappearRegister::new()),
            results: Arc::new(ResultBook::new()),
            calendar: Arc::new(ExamCalendar::new()),
        }
    }

    /// Returns the catalog.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the grace ledger.
    pub fn ledger(&self) -> &GraceLedger {
        &self.ledger
    }

    /// Returns the reappear register.
    pub fn register(&self) -> &ReappearRegister {
        &self.register
    }

    /// Returns the result book.
    pub fn results(&self) -> &ResultBook {
        &self.results
    }

    /// Returns the exam calendar.
    pub fn calendar(&self) -> &ExamCalendar {
        &self.calendar
    }

    // ----- grace and results -----

    /// Enrols a student in a branch and term, computing the term's grace
    /// budget from the branch's subjects.
    ///
    /// Enrolling again recomputes `total_grace` and keeps any grace already
    /// spent.
    pub fn enroll_student(
        &self,
        student_id: &str,
        branch_id: BranchId,
        term_id: TermId,
    ) -> EngineResult<GraceBudget> {
        Self::check_student_id(student_id)?;
        let subjects = self.config.subjects_for_cohort(branch_id, term_id);
        if subjects.is_empty() {
            return Err(EngineError::invalid_input(
                "term_id",
                format!("no subjects are offered to branch {branch_id} in term {term_id}"),
            ));
        }
        let total_grace = self.ledger.compute_budget(student_id, term_id, &subjects)?;
        info!(
            student_id,
            branch_id,
            term_id,
            subjects = subjects.len(),
            total_grace,
            "Student enrolled"
        );
        self.ledger.budget(student_id, term_id)
    }

    /// Snapshot of a student's grace budget for a term.
    pub fn grace_budget(&self, student_id: &str, term_id: TermId) -> EngineResult<GraceBudget> {
        self.ledger.budget(student_id, term_id)
    }

    /// Grace marks the student can still receive this term.
    pub fn remaining_grace(&self, student_id: &str, term_id: TermId) -> EngineResult<u32> {
        self.ledger.remaining(student_id, term_id)
    }

    /// Grades a mark and writes it as the student's result for the subject.
    ///
    /// A mark below the pass mark opens a Pending reappear attempt (or
    /// returns the one already pending). The term's grace budget is
    /// initialised at the same time if the student was never enrolled.
    pub fn record_result(
        &self,
        student_id: &str,
        subject_id: SubjectId,
        marks: u32,
    ) -> EngineResult<RecordedResult> {
        Self::check_student_id(student_id)?;
        let subject = self.config.get_subject(subject_id)?;
        let grade = calculate_grade(marks, subject.max_marks)?;
        let result = SubjectResult {
            student_id: student_id.to_string(),
            subject_id,
            marks,
            grade,
        };
        self.results.record(result.clone());

        let reappear = if marks < subject.passing_mark()? {
            self.ensure_budget(student_id, subject)?;
            Some(self.open_or_existing(student_id, subject)?)
        } else {
            None
        };

        info!(
            student_id,
            subject_id,
            marks,
            grade = %grade,
            reappear = reappear.is_some(),
            "Result recorded"
        );
        Ok(RecordedResult { result, reappear })
    }

    /// The current result for a student and subject.
    pub fn result(&self, student_id: &str, subject_id: SubjectId) -> Option<SubjectResult> {
        self.results.get(student_id, subject_id)
    }

    // ----- reappears -----

    /// Opens a reappear attempt for a subject.
    ///
    /// # Errors
    ///
    /// `AttemptAlreadyOpen` if one is already pending for the pair.
    pub fn open_reappear(
        &self,
        student_id: &str,
        subject_id: SubjectId,
    ) -> EngineResult<ReappearAttempt> {
        Self::check_student_id(student_id)?;
        let subject = self.config.get_subject(subject_id)?;
        self.ensure_budget(student_id, subject)?;
        self.register.open(student_id, subject_id, subject.term_id)
    }

    /// Resolves a pending reappear attempt with its retake score.
    ///
    /// The student's budget for the attempt's term is computed first if it
    /// does not exist yet, so callers never see `BudgetNotFound` from here.
    pub fn resolve_reappear(&self, attempt_id: Uuid, score: u32) -> EngineResult<ReappearOutcome> {
        let attempt = self.register.get(attempt_id)?;
        let subject = self.config.get_subject(attempt.subject_id)?;
        self.ensure_budget(&attempt.student_id, subject)?;

        let resolver = ReappearResolver::new(&self.ledger, &self.register, &self.results);
        resolver.resolve(attempt_id, subject, score).inspect_err(|err| {
            warn!(attempt_id = %attempt_id, score, error = %err, "Reappear resolution rejected");
        })
    }

    /// A snapshot of one attempt.
    pub fn attempt(&self, attempt_id: Uuid) -> EngineResult<ReappearAttempt> {
        self.register.get(attempt_id)
    }

    /// Every Pending attempt in a term, ordered by student then subject.
    pub fn pending_reappears_for_term(&self, term_id: TermId) -> Vec<ReappearAttempt> {
        self.register.pending_in_term(term_id)
    }

    // ----- exams -----

    /// Adds an exam to its cohort's calendar.
    ///
    /// # Errors
    ///
    /// - `SubjectNotFound` if the subject is not in the catalog.
    /// - `InvalidInput` if the subject is not taught to the exam's cohort,
    ///   the id is already in use, or `end_time <= start_time`.
    /// - `SchedulingConflict` if the exam overlaps one already scheduled.
    pub fn schedule_exam(&self, exam: ExamInterval) -> EngineResult<()> {
        self.check_exam_subject(&exam)?;
        self.calendar.schedule(exam)
    }

    /// Schedules an exam given by start time and one of the institution's
    /// allowed durations, returning the interval it occupies.
    pub fn propose_exam(&self, proposal: &ExamProposal) -> EngineResult<ExamInterval> {
        if !self.config.allows_duration(proposal.duration_minutes) {
            return Err(EngineError::invalid_input(
                "duration_minutes",
                format!(
                    "{} minutes is not an allowed exam duration (allowed: {:?})",
                    proposal.duration_minutes,
                    self.config.institution().exam_durations_minutes
                ),
            ));
        }
        let exam = proposal.to_interval()?;
        self.schedule_exam(exam.clone())?;
        Ok(exam)
    }

    /// Previews whether an exam could be scheduled, returning the committed
    /// exam it would collide with. Nothing is changed.
    pub fn check_exam(&self, exam: &ExamInterval) -> EngineResult<Option<ExamInterval>> {
        self.check_exam_subject(exam)?;
        self.calendar.check(exam)
    }

    /// Replaces a scheduled exam, returning the previous version.
    pub fn reschedule_exam(&self, exam: ExamInterval) -> EngineResult<ExamInterval> {
        self.check_exam_subject(&exam)?;
        self.calendar.reschedule(exam)
    }

    /// Removes an exam from the calendar.
    pub fn cancel_exam(&self, exam_id: &str) -> EngineResult<ExamInterval> {
        self.calendar.cancel(exam_id)
    }

    /// A cohort's exams ordered by date and start time.
    pub fn datesheet(&self, branch_id: BranchId, term_id: TermId) -> Vec<ExamInterval> {
        self.calendar.datesheet(Cohort::new(branch_id, term_id))
    }

    // ----- helpers -----

    fn ensure_budget(&self, student_id: &str, subject: &Subject) -> EngineResult<()> {
        if self.ledger.contains(student_id, subject.term_id) {
            return Ok(());
        }
        let subjects = self
            .config
            .subjects_for_cohort(subject.branch_id, subject.term_id);
        let total_grace = self
            .ledger
            .compute_budget(student_id, subject.term_id, &subjects)?;
        info!(
            student_id,
            term_id = subject.term_id,
            total_grace,
            "Grace budget initialised on demand"
        );
        Ok(())
    }

    fn open_or_existing(&self, student_id: &str, subject: &Subject) -> EngineResult<ReappearAttempt> {
        match self.register.open(student_id, subject.id, subject.term_id) {
            Ok(attempt) => Ok(attempt),
            Err(EngineError::AttemptAlreadyOpen { attempt_id, .. }) => {
                self.register.get(attempt_id)
            }
            Err(err) => Err(err),
        }
    }

    fn check_exam_subject(&self, exam: &ExamInterval) -> EngineResult<()> {
        let subject = self.config.get_subject(exam.subject_id)?;
        if !subject.belongs_to(exam.branch_id, exam.term_id) {
            return Err(EngineError::invalid_input(
                "subject_id",
                format!(
                    "subject {} is taught to branch {} term {}, not {}",
                    subject.id,
                    subject.branch_id,
                    subject.term_id,
                    exam.cohort()
                ),
            ));
        }
        Ok(())
    }

    fn check_student_id(student_id: &str) -> EngineResult<()> {
        if student_id.trim().is_empty() {
            return Err(EngineError::invalid_input(
                "student_id",
                "student id must not be empty",
            ));
        }
        Ok(())
    }
}
