//! Data Transfer Objects for the HTTP API.
//!
//! Query strings are decoded into flat records of primitives and then
//! converted into the engine's typed values.

use serde::{Deserialize, Serialize};

use crate::models::{
    AssignmentFilter, CourseLinkId, CurriculumId, InstructorId, ProgramId, RoomId, SeriesId,
    Weekday,
};

/// Query parameters for `GET /v1/assignments`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ListAssignmentsQuery {
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub instructor_id: Option<i64>,
    #[serde(default)]
    pub room_id: Option<i64>,
    /// 1 (Monday) through 6 (Saturday).
    #[serde(default)]
    pub day: Option<u8>,
    #[serde(default)]
    pub parallel: Option<i32>,
    #[serde(default)]
    pub series_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub course_link_id: Option<i64>,
    #[serde(default)]
    pub curriculum_id: Option<i64>,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub semester: Option<i32>,
}

impl TryFrom<ListAssignmentsQuery> for AssignmentFilter {
    type Error = String;

    fn try_from(q: ListAssignmentsQuery) -> Result<Self, Self::Error> {
        let day = q.day.map(Weekday::try_from).transpose()?;
        Ok(AssignmentFilter {
            term: q.term,
            instructor_id: q.instructor_id.map(InstructorId),
            room_id: q.room_id.map(RoomId),
            day,
            parallel: q.parallel,
            series_id: q.series_id.map(SeriesId),
            course_link_id: q.course_link_id.map(CourseLinkId),
            curriculum_id: q.curriculum_id.map(CurriculumId),
            program_id: q.program_id.map(ProgramId),
            semester: q.semester,
            exclude_id: None,
        })
    }
}

/// Query parameters for `PATCH /v1/assignments/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct UpdateQuery {
    #[serde(default)]
    pub apply_to_series: bool,
}

/// Query parameters for `DELETE /v1/assignments/{id}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct DeleteQuery {
    #[serde(default)]
    pub delete_series: bool,
}

/// Query parameters for `GET /v1/workload/course`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseWorkloadQuery {
    pub course_link_id: i64,
    pub parallel: i32,
    pub term: String,
}

/// Query parameters for `GET /v1/workload/instructors/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermQuery {
    pub term: String,
}

/// Request body for `POST /v1/assignments/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub assignment: crate::models::Assignment,
    /// Committed row to ignore, as when re-validating an edit.
    #[serde(default)]
    pub excluding: Option<crate::models::AssignmentId>,
}

/// Request body for `POST /v1/conflicts/{id}/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConflictRequest {
    pub resolution: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected`, `disconnected` or `error: ...`
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_converts_to_filter() {
        let q = ListAssignmentsQuery {
            term: Some("2025-1".to_string()),
            day: Some(3),
            instructor_id: Some(5),
            ..Default::default()
        };
        let filter = AssignmentFilter::try_from(q).unwrap();
        assert_eq!(filter.day, Some(Weekday::Wednesday));
        assert_eq!(filter.instructor_id, Some(InstructorId(5)));
        assert!(filter.exclude_id.is_none());
    }

    #[test]
    fn test_out_of_range_day_is_rejected() {
        let q = ListAssignmentsQuery {
            day: Some(7),
            ..Default::default()
        };
        assert!(AssignmentFilter::try_from(q).is_err());
    }
}
