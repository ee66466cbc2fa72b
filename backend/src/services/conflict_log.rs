//! Conflict log bookkeeping.
//!
//! Appends are best-effort: a failed write is logged and dropped so that
//! diagnostics can never fail the operation that produced them.

use chrono::Utc;
use log::{info, warn};

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{
    AssignmentId, ConflictDetail, ConflictLogEntry, ConflictLogId, NewConflictLogEntry,
};

/// Append `conflict` to the log. Never fails.
///
/// Returns the stored entry when the append went through.
pub async fn record_conflict<R: FullRepository + ?Sized>(
    repo: &R,
    conflict: &ConflictDetail,
    assignment_id: Option<AssignmentId>,
) -> Option<ConflictLogEntry> {
    let entry = NewConflictLogEntry::from_conflict(conflict, assignment_id);
    match repo.append_conflict(&entry).await {
        Ok(stored) => Some(stored),
        Err(e) => {
            warn!(
                "Failed to record {} in conflict log (assignment {:?}): {}",
                conflict.kind, assignment_id, e
            );
            None
        }
    }
}

/// Unresolved entries, newest first.
pub async fn list_pending<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<ConflictLogEntry>> {
    repo.list_pending_conflicts().await
}

/// Mark an entry resolved. Calling it again overwrites the resolution text
/// and timestamp.
pub async fn resolve<R: FullRepository + ?Sized>(
    repo: &R,
    id: ConflictLogId,
    resolution: &str,
) -> RepositoryResult<ConflictLogEntry> {
    let entry = repo.resolve_conflict(id, resolution, Utc::now()).await?;
    info!("Conflict log entry {} resolved", id);
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::models::ConflictKind;

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        let repo = LocalRepository::new();
        repo.set_conflict_log_available(false);
        let conflict = ConflictDetail::new(ConflictKind::Room, "room taken");
        assert!(record_conflict(&repo, &conflict, None).await.is_none());
        assert!(repo.conflict_log_entries().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_twice_overwrites() {
        let repo = LocalRepository::new();
        let conflict = ConflictDetail::new(ConflictKind::Instructor, "double booked");
        let entry = record_conflict(&repo, &conflict, Some(AssignmentId(3)))
            .await
            .unwrap();
        assert_eq!(entry.assignment_id, Some(AssignmentId(3)));

        resolve(&repo, entry.id, "moved to tuesday").await.unwrap();
        let second = resolve(&repo, entry.id, "moved to wednesday").await.unwrap();
        assert!(second.resolved);
        assert_eq!(second.resolution.as_deref(), Some("moved to wednesday"));
        assert!(list_pending(&repo).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_unknown_entry_is_not_found() {
        let repo = LocalRepository::new();
        let err = resolve(&repo, ConflictLogId(99), "n/a").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
