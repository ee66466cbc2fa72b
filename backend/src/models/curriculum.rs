//! Curriculum lookups the engine consumes but does not own.

use serde::{Deserialize, Serialize};

use super::{CourseLinkId, CurriculumId, ProgramId};

/// A course placed at a semester of a curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseLink {
    pub id: CourseLinkId,
    pub course_code: String,
    pub semester: i32,
    pub curriculum_id: CurriculumId,
    pub curriculum_name: String,
    pub program_id: ProgramId,
    pub program_name: String,
}

/// A declared equivalence: `course_code` is taught interchangeably in the
/// target curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equivalence {
    pub course_code: String,
    pub curriculum_id: CurriculumId,
    pub curriculum_name: String,
    pub program_name: String,
}
