use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use super::schema::{assignments, conflict_log};
use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{
    Assignment, AssignmentId, AssignmentPatch, ConflictKind, ConflictLogEntry, ConflictLogId,
    CourseLinkId, InstructorId, NewConflictLogEntry, RoomId, SeriesId, Weekday,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // created_at is only read by operators
pub struct AssignmentRow {
    pub id: i64,
    pub course_link_id: i64,
    pub instructor_id: i64,
    pub room_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub parallel: i32,
    pub term: String,
    pub series_id: Option<Uuid>,
    pub class_type: Option<String>,
    pub modality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = RepositoryError;

    fn try_from(row: AssignmentRow) -> RepositoryResult<Self> {
        let day = Weekday::try_from(row.day_of_week).map_err(RepositoryError::internal)?;
        Ok(Assignment {
            id: Some(AssignmentId(row.id)),
            course_link_id: CourseLinkId(row.course_link_id),
            instructor_id: InstructorId(row.instructor_id),
            room_id: RoomId(row.room_id),
            day,
            start_time: row.start_time.into(),
            end_time: row.end_time.into(),
            parallel: row.parallel,
            term: row.term,
            series_id: row.series_id.map(SeriesId),
            class_type: row.class_type,
            modality: row.modality,
            notes: row.notes,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignments)]
pub struct NewAssignmentRow {
    pub course_link_id: i64,
    pub instructor_id: i64,
    pub room_id: i64,
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub parallel: i32,
    pub term: String,
    pub series_id: Option<Uuid>,
    pub class_type: Option<String>,
    pub modality: Option<String>,
    pub notes: Option<String>,
}

impl From<&Assignment> for NewAssignmentRow {
    fn from(a: &Assignment) -> Self {
        Self {
            course_link_id: a.course_link_id.value(),
            instructor_id: a.instructor_id.value(),
            room_id: a.room_id.value(),
            day_of_week: a.day.number() as i16,
            start_time: a.start_time.into(),
            end_time: a.end_time.into(),
            parallel: a.parallel,
            term: a.term.clone(),
            series_id: a.series_id.map(|s| s.value()),
            class_type: a.class_type.clone(),
            modality: a.modality.clone(),
            notes: a.notes.clone(),
        }
    }
}

/// Patch rendered as a Diesel changeset. `None` columns are left out of the
/// `SET` clause; `Some(None)` on nullable text writes `NULL`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = assignments)]
pub struct AssignmentChangeset {
    pub course_link_id: Option<i64>,
    pub instructor_id: Option<i64>,
    pub room_id: Option<i64>,
    pub day_of_week: Option<i16>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub parallel: Option<i32>,
    pub term: Option<String>,
    pub series_id: Option<Option<Uuid>>,
    pub class_type: Option<Option<String>>,
    pub modality: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl AssignmentChangeset {
    pub fn is_noop(&self) -> bool {
        self.course_link_id.is_none()
            && self.instructor_id.is_none()
            && self.room_id.is_none()
            && self.day_of_week.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.parallel.is_none()
            && self.term.is_none()
            && self.series_id.is_none()
            && self.class_type.is_none()
            && self.modality.is_none()
            && self.notes.is_none()
    }
}

impl From<&AssignmentPatch> for AssignmentChangeset {
    fn from(p: &AssignmentPatch) -> Self {
        Self {
            course_link_id: p.course_link_id.map(|v| v.value()),
            instructor_id: p.instructor_id.map(|v| v.value()),
            room_id: p.room_id.map(|v| v.value()),
            day_of_week: p.day.map(|d| d.number() as i16),
            start_time: p.start_time.map(Into::into),
            end_time: p.end_time.map(Into::into),
            parallel: p.parallel,
            term: p.term.clone(),
            series_id: p.series_id.map(|s| Some(s.value())),
            class_type: p.class_type.clone(),
            modality: p.modality.clone(),
            notes: p.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conflict_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConflictLogRow {
    pub id: i64,
    pub kind: String,
    pub assignment_id: Option<i64>,
    pub description: String,
    pub details: Value,
    pub resolved: bool,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}

impl TryFrom<ConflictLogRow> for ConflictLogEntry {
    type Error = RepositoryError;

    fn try_from(row: ConflictLogRow) -> RepositoryResult<Self> {
        let kind: ConflictKind = row.kind.parse().map_err(RepositoryError::internal)?;
        Ok(ConflictLogEntry {
            id: ConflictLogId(row.id),
            kind,
            assignment_id: row.assignment_id.map(AssignmentId),
            description: row.description,
            details: row.details,
            resolved: row.resolved,
            detected_at: row.detected_at,
            resolved_at: row.resolved_at,
            resolution: row.resolution,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = conflict_log)]
pub struct NewConflictLogRow {
    pub kind: String,
    pub assignment_id: Option<i64>,
    pub description: String,
    pub details: Value,
    pub detected_at: DateTime<Utc>,
}

impl From<&NewConflictLogEntry> for NewConflictLogRow {
    fn from(e: &NewConflictLogEntry) -> Self {
        Self {
            kind: e.kind.as_str().to_string(),
            assignment_id: e.assignment_id.map(|id| id.value()),
            description: e.description.clone(),
            details: e.details.clone(),
            detected_at: e.detected_at,
        }
    }
}

/// Row shape of the `course_workload` SQL function.
#[derive(Debug, Clone, QueryableByName)]
pub struct CourseWorkloadRow {
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub assigned_hours: f64,
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub min_hours: f64,
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub max_hours: f64,
}

/// Row shape of the `instructor_workload` view.
#[derive(Debug, Clone, QueryableByName)]
pub struct InstructorWorkloadRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub assignment_count: i64,
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub course_count: i64,
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub weekly_hours: f64,
}
