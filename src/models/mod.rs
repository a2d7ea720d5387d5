//! Core data models for the Academic Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod exam;
mod grace_budget;
mod grade;
mod reappear;
mod subject;
mod subject_result;

pub use audit::AuditStep;
pub use exam::{Cohort, ExamInterval, ExamProposal};
pub use grace_budget::GraceBudget;
pub use grade::Grade;
pub use reappear::{ReappearAttempt, ReappearStatus};
pub use subject::{BranchId, Subject, SubjectId, TermId};
pub use subject_result::SubjectResult;
