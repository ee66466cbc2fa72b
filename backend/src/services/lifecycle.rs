//! Assignment lifecycle: create, update and delete.
//!
//! Every write validates first and commits afterwards as two separate store
//! calls. Unless a [`WriteGate`] serializes them, two concurrent writers can
//! both pass validation against the same snapshot and both commit.

use log::{info, warn};
use tokio::sync::{Mutex, MutexGuard};

use super::conflict_log::record_conflict;
use super::conflicts::validate_assignment;
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    Assignment, AssignmentId, AssignmentPatch, AssignmentSelector, DeleteOutcome, SeriesId,
    WriteOutcome,
};

/// Optional process-wide lock held across validate-and-commit.
#[derive(Debug, Default)]
pub struct WriteGate {
    lock: Option<Mutex<()>>,
}

impl WriteGate {
    /// No serialization: concurrent writers may race.
    pub fn open() -> Self {
        Self { lock: None }
    }

    /// Serialize validate-and-commit for every caller sharing this gate.
    pub fn serialized() -> Self {
        Self {
            lock: Some(Mutex::new(())),
        }
    }

    pub fn is_serialized(&self) -> bool {
        self.lock.is_some()
    }

    async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

fn reject_malformed(assignment: &Assignment, operation: &str) -> RepositoryResult<()> {
    assignment.check_well_formed().map_err(|msg| {
        RepositoryError::validation_with_context(
            msg,
            ErrorContext::new(operation).with_entity("assignment"),
        )
    })
}

/// Validate and, when admissible, insert `candidate`.
///
/// A candidate without a series id is given a fresh one. A rejection logs
/// the first conflict with no originating assignment.
pub async fn create<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &WriteGate,
    mut candidate: Assignment,
) -> RepositoryResult<WriteOutcome<Assignment>> {
    candidate.id = None;
    reject_malformed(&candidate, "create_assignment")?;

    let _guard = gate.enter().await;
    let validation = validate_assignment(repo, &candidate, None).await?;
    if let Some(conflict) = validation.first_conflict() {
        warn!(
            "Rejected assignment for instructor {} at {}: {}",
            candidate.instructor_id,
            candidate.slot(),
            conflict.message
        );
        record_conflict(repo, conflict, None).await;
        return Ok(WriteOutcome::Rejected {
            conflict: conflict.clone(),
        });
    }

    candidate.series_id.get_or_insert_with(SeriesId::generate);
    let stored = repo.insert_assignment(&candidate).await?;
    info!(
        "Created assignment {:?} ({} in term {})",
        stored.id,
        stored.slot(),
        stored.term
    );
    Ok(WriteOutcome::Committed { data: stored })
}

/// Merge `patch` over assignment `id`, validate the result against every
/// other row and commit.
///
/// With `apply_to_series` and a series id on the row, the same patch is
/// written to every row of the series. Only the target row's merged state
/// is validated; siblings are not re-checked.
pub async fn update<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &WriteGate,
    id: AssignmentId,
    patch: &AssignmentPatch,
    apply_to_series: bool,
) -> RepositoryResult<WriteOutcome<Vec<Assignment>>> {
    let _guard = gate.enter().await;
    let current = repo.get_assignment(id).await?;
    let merged = patch.apply_to(&current);
    reject_malformed(&merged, "update_assignment")?;

    let validation = validate_assignment(repo, &merged, Some(id)).await?;
    if let Some(conflict) = validation.first_conflict() {
        warn!("Rejected update of assignment {}: {}", id, conflict.message);
        record_conflict(repo, conflict, Some(id)).await;
        return Ok(WriteOutcome::Rejected {
            conflict: conflict.clone(),
        });
    }

    let selector = match current.series_id {
        Some(series) if apply_to_series => AssignmentSelector::BySeries(series),
        _ => AssignmentSelector::ById(id),
    };
    let updated = repo.update_assignments(selector, patch).await?;
    info!("Updated {} assignment(s) via {:?}", updated.len(), selector);
    Ok(WriteOutcome::Committed { data: updated })
}

/// Physically remove assignment `id`, or its whole series.
///
/// `delete_series` on a row without a series id deletes just that row.
pub async fn delete<R: FullRepository + ?Sized>(
    repo: &R,
    id: AssignmentId,
    delete_series: bool,
) -> RepositoryResult<DeleteOutcome> {
    let selector = if delete_series {
        match repo.get_assignment(id).await?.series_id {
            Some(series) => AssignmentSelector::BySeries(series),
            None => AssignmentSelector::ById(id),
        }
    } else {
        AssignmentSelector::ById(id)
    };

    let deleted_count = repo.delete_assignments(selector).await?;
    if deleted_count == 0 {
        return Err(RepositoryError::not_found_with_context(
            format!("Assignment {} not found", id),
            ErrorContext::new("delete_assignment")
                .with_entity("assignment")
                .with_entity_id(id),
        ));
    }

    info!("Deleted {} assignment(s) via {:?}", deleted_count, selector);
    Ok(DeleteOutcome { deleted_count })
}
