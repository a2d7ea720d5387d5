//! Reappear attempt register.
//!
//! # Invariants
//! - At most one Pending attempt per (student, subject).
//! - An attempt leaves Pending exactly once, under its own mutex.
//!
//! # Lock order
//! Attempt mutex before the register lock. Nothing acquires an attempt mutex
//! while holding the register lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{ReappearAttempt, ReappearStatus, SubjectId, TermId};

type PairKey = (String, SubjectId);

#[derive(Debug, Default)]
struct RegisterState {
    attempts: HashMap<Uuid, Arc<Mutex<ReappearAttempt>>>,
    pending: HashMap<PairKey, Uuid>,
}

/// Stores reappear attempts and guards their single transition.
#[derive(Debug, Default)]
pub struct ReappearRegister {
    state: RwLock<RegisterState>,
}

impl ReappearRegister {
    /// Creates an empty register.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a Pending attempt for the student and subject.
    ///
    /// # Errors
    ///
    /// Returns `AttemptAlreadyOpen` (carrying the existing attempt's id) when
    /// the pair already has a Pending attempt.
    pub fn open(
        &self,
        student_id: &str,
        subject_id: SubjectId,
        term_id: TermId,
    ) -> EngineResult<ReappearAttempt> {
        let key = (student_id.to_string(), subject_id);
        let mut state = self.state.write();
        if let Some(existing) = state.pending.get(&key) {
            return Err(EngineError::AttemptAlreadyOpen {
                student_id: student_id.to_string(),
                subject_id,
                attempt_id: *existing,
            });
        }

        let attempt = ReappearAttempt::new(student_id, subject_id, term_id);
        state.pending.insert(key, attempt.id);
        state
            .attempts
            .insert(attempt.id, Arc::new(Mutex::new(attempt.clone())));
        info!(
            attempt_id = %attempt.id,
            student_id,
            subject_id,
            term_id,
            "Reappear attempt opened"
        );
        Ok(attempt)
    }

    /// Returns a snapshot of an attempt.
    pub fn get(&self, attempt_id: Uuid) -> EngineResult<ReappearAttempt> {
        Ok(self.entry(attempt_id)?.lock().clone())
    }

    /// The Pending attempt for a student and subject, if any.
    pub fn pending_for(&self, student_id: &str, subject_id: SubjectId) -> Option<ReappearAttempt> {
        let entry = {
            let state = self.state.read();
            let id = state.pending.get(&(student_id.to_string(), subject_id))?;
            state.attempts.get(id).cloned()?
        };
        let attempt = entry.lock().clone();
        attempt.is_pending().then_some(attempt)
    }

    /// All Pending attempts in a term, ordered by student then subject.
    pub fn pending_in_term(&self, term_id: TermId) -> Vec<ReappearAttempt> {
        let entries: Vec<Arc<Mutex<ReappearAttempt>>> = {
            let state = self.state.read();
            state
                .pending
                .values()
                .filter_map(|id| state.attempts.get(id).cloned())
                .collect()
        };
        let mut attempts: Vec<ReappearAttempt> = entries
            .iter()
            .map(|entry| entry.lock().clone())
            .filter(|a| a.is_pending() && a.term_id == term_id)
            .collect();
        attempts.sort_by(|a, b| {
            a.student_id
                .cmp(&b.student_id)
                .then(a.subject_id.cmp(&b.subject_id))
        });
        attempts
    }

    /// Every attempt for a student, in any state.
    pub fn attempts_for_student(&self, student_id: &str) -> Vec<ReappearAttempt> {
        let entries: Vec<Arc<Mutex<ReappearAttempt>>> =
            self.state.read().attempts.values().cloned().collect();
        let mut attempts: Vec<ReappearAttempt> = entries
            .iter()
            .map(|entry| entry.lock().clone())
            .filter(|a| a.student_id == student_id)
            .collect();
        attempts.sort_by_key(|a| a.subject_id);
        attempts
    }

    /// Runs `decide` against a Pending attempt and applies the status it
    /// returns, all under the attempt's mutex.
    ///
    /// `decide` commits whatever side effects belong to the resolution. If it
    /// fails, the attempt stays Pending and the error is returned. If it
    /// succeeds, the attempt moves to the returned terminal status with
    /// `retake_score` recorded, and leaves the pending index.
    ///
    /// # Errors
    ///
    /// - `AttemptNotFound` for an unknown id.
    /// - `AlreadyResolved` if the attempt is not Pending; `decide` is not run.
    /// - `InvalidInput` if `decide` returns `Pending`.
    /// - Any error returned by `decide`.
    pub fn resolve_with<T, F>(&self, attempt_id: Uuid, retake_score: u32, decide: F) -> EngineResult<T>
    where
        F: FnOnce(&ReappearAttempt) -> EngineResult<(ReappearStatus, T)>,
    {
        let entry = self.entry(attempt_id)?;
        let mut attempt = entry.lock();
        if !attempt.is_pending() {
            debug!(attempt_id = %attempt_id, status = %attempt.status, "Attempt already resolved");
            return Err(EngineError::AlreadyResolved {
                attempt_id,
                status: attempt.status,
            });
        }

        let (status, output) = decide(&*attempt)?;
        if !status.is_terminal() {
            return Err(EngineError::invalid_input(
                "status",
                format!("attempt {attempt_id} must resolve to Passed or Failed"),
            ));
        }

        attempt.status = status;
        attempt.retake_score = Some(retake_score);
        self.state
            .write()
            .pending
            .remove(&(attempt.student_id.clone(), attempt.subject_id));
        Ok(output)
    }

    fn entry(&self, attempt_id: Uuid) -> EngineResult<Arc<Mutex<ReappearAttempt>>> {
        self.state
            .read()
            .attempts
            .get(&attempt_id)
            .cloned()
            .ok_or(EngineError::AttemptNotFound { attempt_id })
    }
}
