//! Academic Engine for grading, grace marks and exam scheduling
//!
//! This crate grades subject results, tracks each student's per-term grace
//! marks budget, resolves reappear (retake) attempts against that budget,
//! and keeps per-cohort exam calendars free of overlapping sittings. All
//! state is in memory and safe to share across threads.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod registry;
