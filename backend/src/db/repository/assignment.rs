//! Assignment collection operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{Assignment, AssignmentFilter, AssignmentId, AssignmentPatch, AssignmentSelector};

/// Read and write access to committed assignments.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if it is unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Fetch one assignment.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If no row has this id
    async fn get_assignment(&self, id: AssignmentId) -> RepositoryResult<Assignment>;

    /// All committed rows matching `filter`, ordered by day, start time and id.
    ///
    /// Filter fields that live on the course-curriculum link (curriculum,
    /// program, semester) are resolved through a join.
    async fn find_assignments(&self, filter: &AssignmentFilter) -> RepositoryResult<Vec<Assignment>>;

    /// Insert a row. The input `id` is ignored; the stored row is returned.
    async fn insert_assignment(&self, assignment: &Assignment) -> RepositoryResult<Assignment>;

    /// Apply `patch` to every row the selector matches and return them.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the selector matches nothing
    async fn update_assignments(
        &self,
        selector: AssignmentSelector,
        patch: &AssignmentPatch,
    ) -> RepositoryResult<Vec<Assignment>>;

    /// Physically delete every row the selector matches.
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of rows removed (zero when nothing matched)
    async fn delete_assignments(&self, selector: AssignmentSelector) -> RepositoryResult<u64>;
}
