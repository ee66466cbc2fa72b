//! In-memory local repository implementation.
//!
//! Implements the whole store contract over plain maps, which makes it the
//! test double for the engine and a zero-setup backend for local
//! development. Curriculum data is seeded through the `add_*` helpers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// Cloning is cheap and every clone shares the same data.
///
/// # Example
/// ```
/// use academic_scheduler::db::repositories::LocalRepository;
/// use academic_scheduler::models::{CourseLink, CourseLinkId, CurriculumId, ProgramId};
///
/// let repo = LocalRepository::new();
/// repo.add_course_link(
///     CourseLink {
///         id: CourseLinkId(1),
///         course_code: "MAT-101".to_string(),
///         semester: 1,
///         curriculum_id: CurriculumId(1),
///         curriculum_name: "Systems 2020".to_string(),
///         program_id: ProgramId(1),
///         program_name: "Systems Engineering".to_string(),
///     },
///     4.0,
///     6.0,
/// );
/// assert_eq!(repo.assignment_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct HourBounds {
    min: f64,
    max: f64,
}

struct LocalData {
    assignments: BTreeMap<AssignmentId, Assignment>,
    course_links: HashMap<CourseLinkId, CourseLink>,
    hour_bounds: HashMap<CourseLinkId, HourBounds>,
    equivalences: Vec<Equivalence>,
    conflict_log: BTreeMap<ConflictLogId, ConflictLogEntry>,

    // ID counters
    next_assignment_id: i64,
    next_conflict_id: i64,

    // Fault injection
    is_healthy: bool,
    conflict_log_available: bool,
    yield_after_reads: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            assignments: BTreeMap::new(),
            course_links: HashMap::new(),
            hour_bounds: HashMap::new(),
            equivalences: Vec::new(),
            conflict_log: BTreeMap::new(),
            next_assignment_id: 1,
            next_conflict_id: 1,
            is_healthy: true,
            conflict_log_available: true,
            yield_after_reads: false,
        }
    }
}

impl LocalData {
    fn link_matches(&self, filter: &AssignmentFilter, row: &Assignment) -> bool {
        if filter.curriculum_id.is_none() && filter.program_id.is_none() && filter.semester.is_none()
        {
            return true;
        }
        let Some(link) = self.course_links.get(&row.course_link_id) else {
            return false;
        };
        filter.curriculum_id.map_or(true, |c| link.curriculum_id == c)
            && filter.program_id.map_or(true, |p| link.program_id == p)
            && filter.semester.map_or(true, |s| link.semester == s)
    }

    fn selected_ids(&self, selector: AssignmentSelector) -> Vec<AssignmentId> {
        match selector {
            AssignmentSelector::ById(id) => self
                .assignments
                .contains_key(&id)
                .then_some(id)
                .into_iter()
                .collect(),
            AssignmentSelector::BySeries(series) => self
                .assignments
                .values()
                .filter(|a| a.series_id == Some(series))
                .filter_map(|a| a.id)
                .collect(),
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Seed a course-curriculum link together with its weekly-hours bounds.
    pub fn add_course_link(&self, link: CourseLink, min_hours: f64, max_hours: f64) {
        let mut data = self.data.write();
        data.hour_bounds.insert(
            link.id,
            HourBounds {
                min: min_hours,
                max: max_hours,
            },
        );
        data.course_links.insert(link.id, link);
    }

    /// Seed an equivalence. Lookups return equivalences in insertion order.
    pub fn add_equivalence(&self, equivalence: Equivalence) {
        self.data.write().equivalences.push(equivalence);
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Make conflict log appends fail while everything else keeps working.
    pub fn set_conflict_log_available(&self, available: bool) {
        self.data.write().conflict_log_available = available;
    }

    /// Hand control back to the runtime after every assignment read, so
    /// concurrent writers interleave between validation and commit the way
    /// they do against a networked store.
    pub fn set_yield_after_reads(&self, enabled: bool) {
        self.data.write().yield_after_reads = enabled;
    }

    /// Remove all assignments and log entries, keeping curriculum seed data.
    pub fn clear(&self) {
        let mut data = self.data.write();
        data.assignments.clear();
        data.conflict_log.clear();
        data.next_assignment_id = 1;
        data.next_conflict_id = 1;
    }

    /// Get the number of committed assignments.
    pub fn assignment_count(&self) -> usize {
        self.data.read().assignments.len()
    }

    /// Every conflict log entry, resolved or not, in append order.
    pub fn conflict_log_entries(&self) -> Vec<ConflictLogEntry> {
        self.data.read().conflict_log.values().cloned().collect()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }

    fn missing_assignment(id: AssignmentId, operation: &str) -> RepositoryError {
        RepositoryError::not_found_with_context(
            format!("Assignment {} not found", id),
            ErrorContext::new(operation)
                .with_entity("assignment")
                .with_entity_id(id),
        )
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssignmentRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn get_assignment(&self, id: AssignmentId) -> RepositoryResult<Assignment> {
        self.check_health("get_assignment")?;
        self.data
            .read()
            .assignments
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::missing_assignment(id, "get_assignment"))
    }

    async fn find_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> RepositoryResult<Vec<Assignment>> {
        self.check_health("find_assignments")?;
        let (mut rows, yield_now) = {
            let data = self.data.read();
            let rows: Vec<Assignment> = data
                .assignments
                .values()
                .filter(|a| filter.matches_row(a) && data.link_matches(filter, a))
                .cloned()
                .collect();
            (rows, data.yield_after_reads)
        };
        rows.sort_by_key(|a| (a.day, a.start_time, a.id));
        if yield_now {
            tokio::task::yield_now().await;
        }
        Ok(rows)
    }

    async fn insert_assignment(&self, assignment: &Assignment) -> RepositoryResult<Assignment> {
        self.check_health("insert_assignment")?;
        let mut data = self.data.write();
        let id = AssignmentId(data.next_assignment_id);
        data.next_assignment_id += 1;

        let mut stored = assignment.clone();
        stored.id = Some(id);
        data.assignments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_assignments(
        &self,
        selector: AssignmentSelector,
        patch: &AssignmentPatch,
    ) -> RepositoryResult<Vec<Assignment>> {
        self.check_health("update_assignments")?;
        let mut data = self.data.write();
        let ids = data.selected_ids(selector);
        if ids.is_empty() {
            return Err(match selector {
                AssignmentSelector::ById(id) => Self::missing_assignment(id, "update_assignments"),
                AssignmentSelector::BySeries(series) => RepositoryError::not_found_with_context(
                    format!("Series {} has no assignments", series),
                    ErrorContext::new("update_assignments")
                        .with_entity("series")
                        .with_entity_id(series),
                ),
            });
        }

        let mut updated = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(row) = data.assignments.get_mut(&id) {
                *row = patch.apply_to(row);
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete_assignments(&self, selector: AssignmentSelector) -> RepositoryResult<u64> {
        self.check_health("delete_assignments")?;
        let mut data = self.data.write();
        let ids = data.selected_ids(selector);
        let removed = ids
            .iter()
            .filter(|id| data.assignments.remove(id).is_some())
            .count();
        Ok(removed as u64)
    }
}

#[async_trait]
impl CurriculumRepository for LocalRepository {
    async fn get_course_link(&self, id: CourseLinkId) -> RepositoryResult<CourseLink> {
        self.check_health("get_course_link")?;
        self.data
            .read()
            .course_links
            .get(&id)
            .cloned()
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Course link {} not found", id),
                    ErrorContext::new("get_course_link")
                        .with_entity("course_link")
                        .with_entity_id(id),
                )
            })
    }

    async fn find_course_link(
        &self,
        curriculum_id: CurriculumId,
        course_code: &str,
        semester: i32,
    ) -> RepositoryResult<Option<CourseLink>> {
        self.check_health("find_course_link")?;
        let data = self.data.read();
        let mut matches: Vec<&CourseLink> = data
            .course_links
            .values()
            .filter(|l| {
                l.curriculum_id == curriculum_id
                    && l.course_code == course_code
                    && l.semester == semester
            })
            .collect();
        matches.sort_by_key(|l| l.id);
        Ok(matches.first().map(|l| (*l).clone()))
    }

    async fn find_equivalences(&self, course_code: &str) -> RepositoryResult<Vec<Equivalence>> {
        self.check_health("find_equivalences")?;
        Ok(self
            .data
            .read()
            .equivalences
            .iter()
            .filter(|e| e.course_code == course_code)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WorkloadRepository for LocalRepository {
    async fn compute_course_workload(
        &self,
        course_link_id: CourseLinkId,
        parallel: i32,
        term: &str,
    ) -> RepositoryResult<WorkloadFigures> {
        self.check_health("compute_course_workload")?;
        let data = self.data.read();
        let bounds = data.hour_bounds.get(&course_link_id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Course link {} not found", course_link_id),
                ErrorContext::new("compute_course_workload")
                    .with_entity("course_link")
                    .with_entity_id(course_link_id),
            )
        })?;

        let assigned_hours = data
            .assignments
            .values()
            .filter(|a| a.course_link_id == course_link_id && a.parallel == parallel && a.term == term)
            .map(Assignment::weekly_hours)
            .sum();

        Ok(WorkloadFigures {
            assigned_hours,
            min_hours: bounds.min,
            max_hours: bounds.max,
        })
    }

    async fn fetch_instructor_workload(
        &self,
        instructor_id: InstructorId,
        term: &str,
    ) -> RepositoryResult<InstructorWorkload> {
        self.check_health("fetch_instructor_workload")?;
        let data = self.data.read();
        let rows: Vec<&Assignment> = data
            .assignments
            .values()
            .filter(|a| a.instructor_id == instructor_id && a.term == term)
            .collect();
        let courses: HashSet<CourseLinkId> = rows.iter().map(|a| a.course_link_id).collect();

        Ok(InstructorWorkload {
            instructor_id,
            term: term.to_string(),
            assignment_count: rows.len(),
            course_count: courses.len(),
            weekly_hours: rows.iter().map(|a| a.weekly_hours()).sum(),
        })
    }
}

#[async_trait]
impl ConflictLogRepository for LocalRepository {
    async fn append_conflict(
        &self,
        entry: &NewConflictLogEntry,
    ) -> RepositoryResult<ConflictLogEntry> {
        self.check_health("append_conflict")?;
        let mut data = self.data.write();
        if !data.conflict_log_available {
            return Err(RepositoryError::query_with_context(
                "conflict log table unavailable",
                ErrorContext::new("append_conflict").with_entity("conflict_log"),
            ));
        }

        let id = ConflictLogId(data.next_conflict_id);
        data.next_conflict_id += 1;
        let stored = ConflictLogEntry {
            id,
            kind: entry.kind,
            assignment_id: entry.assignment_id,
            description: entry.description.clone(),
            details: entry.details.clone(),
            resolved: false,
            detected_at: entry.detected_at,
            resolved_at: None,
            resolution: None,
        };
        data.conflict_log.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_pending_conflicts(&self) -> RepositoryResult<Vec<ConflictLogEntry>> {
        self.check_health("list_pending_conflicts")?;
        let mut pending: Vec<ConflictLogEntry> = self
            .data
            .read()
            .conflict_log
            .values()
            .filter(|e| !e.resolved)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.detected_at.cmp(&a.detected_at).then(b.id.cmp(&a.id)));
        Ok(pending)
    }

    async fn resolve_conflict(
        &self,
        id: ConflictLogId,
        resolution: &str,
        resolved_at: DateTime<Utc>,
    ) -> RepositoryResult<ConflictLogEntry> {
        self.check_health("resolve_conflict")?;
        let mut data = self.data.write();
        let entry = data.conflict_log.get_mut(&id).ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Conflict log entry {} not found", id),
                ErrorContext::new("resolve_conflict")
                    .with_entity("conflict_log")
                    .with_entity_id(id),
            )
        })?;
        entry.resolved = true;
        entry.resolution = Some(resolution.to_string());
        entry.resolved_at = Some(resolved_at);
        Ok(entry.clone())
    }
}
