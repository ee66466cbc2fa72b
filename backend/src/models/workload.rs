//! Weekly-hours bookkeeping.

use serde::{Deserialize, Serialize};

use super::{ConflictDetail, ConflictKind, CourseLinkId, InstructorId};

/// Raw figures computed by the store for one (course link, parallel, term).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadFigures {
    pub assigned_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
}

/// Advisory verdict on whether a course section carries a legal weekly load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadReport {
    pub course_link_id: CourseLinkId,
    pub parallel: i32,
    pub term: String,
    pub is_valid: bool,
    pub assigned_hours: f64,
    pub min_hours: f64,
    pub max_hours: f64,
    pub message: String,
}

impl WorkloadReport {
    /// Convert a failing report into a conflict for callers that block on it.
    pub fn to_conflict(&self) -> Option<ConflictDetail> {
        if self.is_valid {
            return None;
        }
        Some(ConflictDetail::new(ConflictKind::Workload, self.message.clone()))
    }
}

/// Aggregate teaching load of one instructor in a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructorWorkload {
    pub instructor_id: InstructorId,
    pub term: String,
    pub assignment_count: usize,
    pub course_count: usize,
    pub weekly_hours: f64,
}
