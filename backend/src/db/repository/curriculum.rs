//! Curriculum lookups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::models::{CourseLink, CourseLinkId, CurriculumId, Equivalence};

/// Read-only access to course-curriculum links and the equivalence map.
#[async_trait]
pub trait CurriculumRepository: Send + Sync {
    /// Resolve a link with its course code, semester and display names.
    ///
    /// # Returns
    /// * `Err(RepositoryError::NotFound)` - If the link does not exist
    async fn get_course_link(&self, id: CourseLinkId) -> RepositoryResult<CourseLink>;

    /// Find the link for `course_code` at `semester` inside a curriculum.
    ///
    /// # Returns
    /// * `Ok(None)` - If the curriculum does not place that course at that semester
    async fn find_course_link(
        &self,
        curriculum_id: CurriculumId,
        course_code: &str,
        semester: i32,
    ) -> RepositoryResult<Option<CourseLink>>;

    /// Curricula declaring an equivalence for `course_code`, in a stable order.
    async fn find_equivalences(&self, course_code: &str) -> RepositoryResult<Vec<Equivalence>>;
}
