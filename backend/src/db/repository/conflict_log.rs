//! Conflict log persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{ConflictLogEntry, ConflictLogId, NewConflictLogEntry};

/// Append-only conflict log with a resolution workflow. Entries are never deleted.
#[async_trait]
pub trait ConflictLogRepository: Send + Sync {
    /// Append an unresolved entry.
    async fn append_conflict(&self, entry: &NewConflictLogEntry) -> RepositoryResult<ConflictLogEntry>;

    /// Unresolved entries, most recently detected first.
    async fn list_pending_conflicts(&self) -> RepositoryResult<Vec<ConflictLogEntry>>;

    /// Mark an entry resolved, overwriting any earlier resolution metadata.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the entry does not exist
    async fn resolve_conflict(
        &self,
        id: ConflictLogId,
        resolution: &str,
        resolved_at: DateTime<Utc>,
    ) -> RepositoryResult<ConflictLogEntry>;
}
