//! Results handed back to callers of write and replication operations.

use serde::{Deserialize, Serialize};

use super::ConflictDetail;

/// Result of a validated write: either the committed rows or the first
/// conflict that blocked them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome<T> {
    Committed { data: T },
    Rejected { conflict: ConflictDetail },
}

impl<T> WriteOutcome<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, WriteOutcome::Committed { .. })
    }

    pub fn committed(self) -> Option<T> {
        match self {
            WriteOutcome::Committed { data } => Some(data),
            WriteOutcome::Rejected { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<&ConflictDetail> {
        match self {
            WriteOutcome::Committed { .. } => None,
            WriteOutcome::Rejected { conflict } => Some(conflict),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Per-target line of a replication report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationTarget {
    pub curriculum_name: String,
    pub program_name: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate of a best-effort replication fan-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationResult {
    pub succeeded: bool,
    pub created_count: usize,
    pub failed_count: usize,
    pub details: Vec<ReplicationTarget>,
}

impl ReplicationResult {
    /// Build the aggregate from per-target lines, in processing order.
    pub fn from_targets(details: Vec<ReplicationTarget>) -> Self {
        let created_count = details.iter().filter(|d| d.success).count();
        let failed_count = details.len() - created_count;
        Self {
            succeeded: failed_count == 0,
            created_count,
            failed_count,
            details,
        }
    }
}
