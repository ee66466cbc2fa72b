//! Conflict reports and the persisted conflict log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Assignment, AssignmentId, ConflictLogId};

/// Which invariant a proposed assignment violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictKind {
    /// The instructor already teaches during the slot.
    #[serde(rename = "instructor-conflict")]
    Instructor,
    /// The room is already occupied during the slot.
    #[serde(rename = "room-conflict")]
    Room,
    /// The student cohort already attends another class during the slot.
    #[serde(rename = "parallel-conflict")]
    ParallelGroup,
    /// Weekly hours for the section fall outside the configured bounds.
    #[serde(rename = "workload-invalid")]
    Workload,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::Instructor => "instructor-conflict",
            ConflictKind::Room => "room-conflict",
            ConflictKind::ParallelGroup => "parallel-conflict",
            ConflictKind::Workload => "workload-invalid",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructor-conflict" => Ok(ConflictKind::Instructor),
            "room-conflict" => Ok(ConflictKind::Room),
            "parallel-conflict" => Ok(ConflictKind::ParallelGroup),
            "workload-invalid" => Ok(ConflictKind::Workload),
            other => Err(format!("Unknown conflict kind: {}", other)),
        }
    }
}

/// One violated invariant, with the committed rows it collides with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetail {
    pub kind: ConflictKind,
    pub message: String,
    #[serde(default)]
    pub conflicting: Vec<Assignment>,
}

impl ConflictDetail {
    pub fn new(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            conflicting: Vec::new(),
        }
    }

    pub fn with_conflicting(mut self, rows: Vec<Assignment>) -> Self {
        self.conflicting = rows;
        self
    }

    pub fn conflicting_ids(&self) -> Vec<AssignmentId> {
        self.conflicting.iter().filter_map(|a| a.id).collect()
    }

    /// Snapshot of the colliding rows as stored in the conflict log.
    pub fn details_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.conflicting).unwrap_or(serde_json::Value::Null)
    }
}

/// Outcome of running every conflict validator against one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub conflicts: Vec<ConflictDetail>,
}

impl ValidationResult {
    pub fn from_conflicts(conflicts: Vec<ConflictDetail>) -> Self {
        Self {
            valid: conflicts.is_empty(),
            conflicts,
        }
    }

    pub fn first_conflict(&self) -> Option<&ConflictDetail> {
        self.conflicts.first()
    }

    pub fn has_kind(&self, kind: ConflictKind) -> bool {
        self.conflicts.iter().any(|c| c.kind == kind)
    }
}

/// Conflict log row as written by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConflictLogEntry {
    pub kind: ConflictKind,
    pub assignment_id: Option<AssignmentId>,
    pub description: String,
    pub details: serde_json::Value,
    pub detected_at: DateTime<Utc>,
}

impl NewConflictLogEntry {
    pub fn from_conflict(conflict: &ConflictDetail, assignment_id: Option<AssignmentId>) -> Self {
        Self {
            kind: conflict.kind,
            assignment_id,
            description: conflict.message.clone(),
            details: conflict.details_json(),
            detected_at: Utc::now(),
        }
    }
}

/// Persisted conflict log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictLogEntry {
    pub id: ConflictLogId,
    pub kind: ConflictKind,
    pub assignment_id: Option<AssignmentId>,
    pub description: String,
    pub details: serde_json::Value,
    pub resolved: bool,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}
