//! Weekly-hours computations owned by the store.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CourseLinkId, InstructorId, InstructorWorkload, WorkloadFigures};

/// Opaque workload figures. The engine interprets them but never computes them.
#[async_trait]
pub trait WorkloadRepository: Send + Sync {
    /// Assigned weekly hours and configured bounds for a course section.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the course link does not exist
    async fn compute_course_workload(
        &self,
        course_link_id: CourseLinkId,
        parallel: i32,
        term: &str,
    ) -> RepositoryResult<WorkloadFigures>;

    /// Aggregate load of one instructor across all courses in a term.
    async fn fetch_instructor_workload(
        &self,
        instructor_id: InstructorId,
        term: &str,
    ) -> RepositoryResult<InstructorWorkload>;
}
