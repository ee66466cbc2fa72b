//! Assignment records, partial updates and query shapes.

use serde::{Deserialize, Deserializer, Serialize};

use super::time::{ClockTime, TimeSlot, Weekday};
use super::{
    AssignmentId, CourseLinkId, CurriculumId, InstructorId, ProgramId, RoomId, SeriesId,
};

/// One scheduled occurrence of a course section.
///
/// `id` is `None` for candidates that have not been committed yet; the
/// store assigns it on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub id: Option<AssignmentId>,
    pub course_link_id: CourseLinkId,
    pub instructor_id: InstructorId,
    pub room_id: RoomId,
    pub day: Weekday,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
    pub parallel: i32,
    pub term: String,
    #[serde(default)]
    pub series_id: Option<SeriesId>,
    #[serde(default)]
    pub class_type: Option<String>,
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Assignment {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.day, self.start_time, self.end_time)
    }

    pub fn weekly_hours(&self) -> f64 {
        self.slot().duration_hours()
    }

    /// Structural checks that must hold before any conflict query runs.
    pub fn check_well_formed(&self) -> Result<(), String> {
        if !self.slot().is_well_formed() {
            return Err(format!(
                "start time {} must be earlier than end time {}",
                self.start_time, self.end_time
            ));
        }
        if self.term.trim().is_empty() {
            return Err("term must not be empty".to_string());
        }
        Ok(())
    }
}

/// Deserializes a present-but-null field as `Some(None)` so patches can
/// clear optional text columns.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial change-set for an assignment. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_link_id: Option<CourseLinkId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor_id: Option<InstructorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<ClockTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_id: Option<SeriesId>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub class_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub modality: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
}

impl AssignmentPatch {
    pub fn is_empty(&self) -> bool {
        *self == AssignmentPatch::default()
    }

    /// Merge the patch over `base`, field by field. The id is never touched.
    pub fn apply_to(&self, base: &Assignment) -> Assignment {
        let mut merged = base.clone();
        if let Some(v) = self.course_link_id {
            merged.course_link_id = v;
        }
        if let Some(v) = self.instructor_id {
            merged.instructor_id = v;
        }
        if let Some(v) = self.room_id {
            merged.room_id = v;
        }
        if let Some(v) = self.day {
            merged.day = v;
        }
        if let Some(v) = self.start_time {
            merged.start_time = v;
        }
        if let Some(v) = self.end_time {
            merged.end_time = v;
        }
        if let Some(v) = self.parallel {
            merged.parallel = v;
        }
        if let Some(ref v) = self.term {
            merged.term = v.clone();
        }
        if let Some(v) = self.series_id {
            merged.series_id = Some(v);
        }
        if let Some(ref v) = self.class_type {
            merged.class_type = v.clone();
        }
        if let Some(ref v) = self.modality {
            merged.modality = v.clone();
        }
        if let Some(ref v) = self.notes {
            merged.notes = v.clone();
        }
        merged
    }
}

/// Which committed rows an update or delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentSelector {
    ById(AssignmentId),
    BySeries(SeriesId),
}

/// Equality filter over committed assignments. Unset fields match anything;
/// set fields are AND-combined. `curriculum`, `program` and `semester` are
/// resolved through the course-curriculum link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentFilter {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub instructor_id: Option<InstructorId>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub day: Option<Weekday>,
    #[serde(default)]
    pub parallel: Option<i32>,
    #[serde(default)]
    pub series_id: Option<SeriesId>,
    #[serde(default)]
    pub course_link_id: Option<CourseLinkId>,
    #[serde(default)]
    pub curriculum_id: Option<CurriculumId>,
    #[serde(default)]
    pub program_id: Option<ProgramId>,
    #[serde(default)]
    pub semester: Option<i32>,
    #[serde(default)]
    pub exclude_id: Option<AssignmentId>,
}

impl AssignmentFilter {
    pub fn for_term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Default::default()
        }
    }

    /// Test a row against every filter field that does not need the
    /// course-link join. Join fields are the store's concern.
    pub fn matches_row(&self, row: &Assignment) -> bool {
        fn eq<T: PartialEq>(want: &Option<T>, have: &T) -> bool {
            want.as_ref().map_or(true, |w| w == have)
        }

        eq(&self.term, &row.term)
            && eq(&self.instructor_id, &row.instructor_id)
            && eq(&self.room_id, &row.room_id)
            && eq(&self.day, &row.day)
            && eq(&self.parallel, &row.parallel)
            && eq(&self.course_link_id, &row.course_link_id)
            && self.series_id.map_or(true, |s| row.series_id == Some(s))
            && self.exclude_id.map_or(true, |x| row.id != Some(x))
    }
}
