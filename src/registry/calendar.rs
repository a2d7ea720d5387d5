//! Per-cohort exam calendars.
//!
//! Each cohort's exams sit behind their own mutex, and every mutation
//! re-runs the conflict check against the committed set while holding it.
//! An id index maps exam ids to cohorts so updates and cancellations can
//! find an exam without scanning every calendar.
//!
//! # Lock order
//! Cohort mutexes (ascending [`Cohort`] order when two are needed), then the
//! id index.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use crate::calculation::find_conflict;
use crate::error::{EngineError, EngineResult};
use crate::models::{Cohort, ExamInterval};

type CohortExams = Arc<Mutex<Vec<ExamInterval>>>;

/// Exam calendars for every cohort.
#[derive(Debug, Default)]
pub struct ExamCalendar {
    cohorts: RwLock<HashMap<Cohort, CohortExams>>,
    index: Mutex<HashMap<String, Cohort>>,
}

impl ExamCalendar {
    /// Creates an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dry-run check: the committed exam the candidate would collide with.
    ///
    /// An exam already on the calendar under the candidate's id is left out,
    /// so this also previews a reschedule.
    pub fn check(&self, candidate: &ExamInterval) -> EngineResult<Option<ExamInterval>> {
        candidate.validate()?;
        let entry = self.cohort_entry(candidate.cohort());
        let exams = entry.lock();
        let hit = find_conflict(exams.iter().filter(|e| e.id != candidate.id), candidate)?;
        Ok(hit.cloned())
    }

    /// Adds an exam to its cohort's calendar.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed interval or an id already scheduled.
    /// - `SchedulingConflict` naming the committed exam it overlaps.
    pub fn schedule(&self, candidate: ExamInterval) -> EngineResult<()> {
        candidate.validate()?;
        let cohort = candidate.cohort();
        let entry = self.cohort_entry(cohort);
        let mut exams = entry.lock();
        let mut index = self.index.lock();

        if index.contains_key(&candidate.id) {
            return Err(EngineError::invalid_input(
                "id",
                format!("exam '{}' is already scheduled", candidate.id),
            ));
        }
        Self::ensure_free(exams.iter(), &candidate)?;

        index.insert(candidate.id.clone(), cohort);
        info!(
            exam_id = %candidate.id,
            subject_id = candidate.subject_id,
            cohort = %cohort,
            exam_date = %candidate.exam_date,
            "Exam scheduled"
        );
        exams.push(candidate);
        Ok(())
    }

    /// Replaces a scheduled exam, possibly moving it to another cohort.
    ///
    /// The exam's current entry is excluded from the conflict check. Returns
    /// the entry that was replaced.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a malformed interval.
    /// - `ExamNotFound` if no exam has this id.
    /// - `SchedulingConflict` naming the committed exam it overlaps.
    pub fn reschedule(&self, updated: ExamInterval) -> EngineResult<ExamInterval> {
        updated.validate()?;
        let target = updated.cohort();

        loop {
            let source = self.locate(&updated.id)?;
            let source_entry = self.cohort_entry(source);

            if source == target {
                let mut exams = source_entry.lock();
                let _index = self.index.lock();
                let Some(position) = exams.iter().position(|e| e.id == updated.id) else {
                    continue;
                };
                Self::ensure_free(exams.iter().filter(|e| e.id != updated.id), &updated)?;
                let previous = std::mem::replace(&mut exams[position], updated);
                info!(exam_id = %previous.id, cohort = %target, "Exam rescheduled");
                return Ok(previous);
            }

            let target_entry = self.cohort_entry(target);
            let (mut from, mut to) = if source < target {
                (source_entry.lock(), target_entry.lock())
            } else {
                let to = target_entry.lock();
                (source_entry.lock(), to)
            };
            let mut index = self.index.lock();
            let Some(position) = from.iter().position(|e| e.id == updated.id) else {
                continue;
            };
            Self::ensure_free(to.iter(), &updated)?;

            let previous = from.remove(position);
            index.insert(updated.id.clone(), target);
            info!(
                exam_id = %updated.id,
                from = %source,
                to = %target,
                "Exam moved to another cohort"
            );
            to.push(updated);
            return Ok(previous);
        }
    }

    /// Removes an exam from the calendar and returns it.
    pub fn cancel(&self, exam_id: &str) -> EngineResult<ExamInterval> {
        loop {
            let cohort = self.locate(exam_id)?;
            let entry = self.cohort_entry(cohort);
            let mut exams = entry.lock();
            let mut index = self.index.lock();
            if let Some(position) = exams.iter().position(|e| e.id == exam_id) {
                index.remove(exam_id);
                let removed = exams.remove(position);
                info!(exam_id, cohort = %cohort, "Exam cancelled");
                return Ok(removed);
            }
        }
    }

    /// Returns a scheduled exam by id.
    pub fn exam(&self, exam_id: &str) -> EngineResult<ExamInterval> {
        loop {
            let cohort = self.locate(exam_id)?;
            let entry = self.cohort_entry(cohort);
            let exams = entry.lock();
            if let Some(exam) = exams.iter().find(|e| e.id == exam_id) {
                return Ok(exam.clone());
            }
        }
    }

    /// A cohort's exams ordered by date, then start time, then id.
    pub fn datesheet(&self, cohort: Cohort) -> Vec<ExamInterval> {
        let Some(entry) = self.cohorts.read().get(&cohort).cloned() else {
            return Vec::new();
        };
        let mut exams = entry.lock().clone();
        exams.sort_by(|a, b| {
            a.exam_date
                .cmp(&b.exam_date)
                .then(a.start_time.cmp(&b.start_time))
                .then(a.id.cmp(&b.id))
        });
        exams
    }

    /// Number of exams across all cohorts.
    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    /// Returns true if no exam is scheduled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_free<'a, I>(existing: I, candidate: &ExamInterval) -> EngineResult<()>
    where
        I: IntoIterator<Item = &'a ExamInterval>,
    {
        if let Some(hit) = find_conflict(existing, candidate)? {
            warn!(
                exam_id = %candidate.id,
                conflicting_exam_id = %hit.id,
                exam_date = %candidate.exam_date,
                "Exam rejected: scheduling conflict"
            );
            return Err(EngineError::SchedulingConflict {
                exam_id: candidate.id.clone(),
                conflicting: Box::new(hit.clone()),
            });
        }
        Ok(())
    }

    fn locate(&self, exam_id: &str) -> EngineResult<Cohort> {
        self.index
            .lock()
            .get(exam_id)
            .copied()
            .ok_or_else(|| EngineError::ExamNotFound {
                exam_id: exam_id.to_string(),
            })
    }

    fn cohort_entry(&self, cohort: Cohort) -> CohortExams {
        if let Some(entry) = self.cohorts.read().get(&cohort) {
            return Arc::clone(entry);
        }
        Arc::clone(self.cohorts.write().entry(cohort).or_default())
    }
}
