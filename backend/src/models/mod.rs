//! Domain records shared by the store contract, the engine and the HTTP layer.

pub mod assignment;
pub mod conflict;
pub mod curriculum;
pub mod macros;
pub mod outcome;
pub mod time;
pub mod workload;

pub use assignment::*;
pub use conflict::*;
pub use curriculum::*;
pub use outcome::*;
pub use time::*;
pub use workload::*;

use crate::define_id_type;

define_id_type!(i64, AssignmentId, "Assignment primary key, assigned by the store.");
define_id_type!(i64, InstructorId, "Instructor identifier.");
define_id_type!(i64, RoomId, "Room identifier.");
define_id_type!(i64, CourseLinkId, "Course-curriculum link identifier.");
define_id_type!(i64, CurriculumId, "Curriculum identifier.");
define_id_type!(i64, ProgramId, "Degree program identifier.");
define_id_type!(i64, ConflictLogId, "Conflict log entry identifier.");
define_id_type!(
    uuid::Uuid,
    SeriesId,
    "Identity shared by every row of one recurring logical assignment."
);

impl SeriesId {
    /// Fresh, globally unique series identity.
    pub fn generate() -> Self {
        SeriesId(uuid::Uuid::new_v4())
    }
}
