//! Advisory workload checks.
//!
//! The store computes the figures; this module only interprets them. The
//! lifecycle never calls these on its own.

use log::debug;

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{CourseLinkId, InstructorId, InstructorWorkload, WorkloadFigures, WorkloadReport};

/// Tolerance for comparing hour sums built from minute-granularity slots.
const HOURS_EPSILON: f64 = 1e-9;

/// Compare the weekly hours of one course section against its bounds.
pub async fn validate_workload<R: FullRepository + ?Sized>(
    repo: &R,
    course_link_id: CourseLinkId,
    parallel: i32,
    term: &str,
) -> RepositoryResult<WorkloadReport> {
    let figures = repo
        .compute_course_workload(course_link_id, parallel, term)
        .await?;
    let report = build_report(course_link_id, parallel, term, figures);
    debug!(
        "Workload for link {} parallel {} in {}: {}",
        course_link_id, parallel, term, report.message
    );
    Ok(report)
}

/// Pure interpretation of store figures.
pub fn build_report(
    course_link_id: CourseLinkId,
    parallel: i32,
    term: &str,
    figures: WorkloadFigures,
) -> WorkloadReport {
    let WorkloadFigures {
        assigned_hours,
        min_hours,
        max_hours,
    } = figures;

    let (is_valid, message) = if assigned_hours + HOURS_EPSILON < min_hours {
        (
            false,
            format!(
                "{:.2} weekly hours assigned, {:.2} below the minimum of {:.2}",
                assigned_hours,
                min_hours - assigned_hours,
                min_hours
            ),
        )
    } else if assigned_hours > max_hours + HOURS_EPSILON {
        (
            false,
            format!(
                "{:.2} weekly hours assigned, {:.2} above the maximum of {:.2}",
                assigned_hours,
                assigned_hours - max_hours,
                max_hours
            ),
        )
    } else {
        (
            true,
            format!(
                "{:.2} weekly hours assigned, within {:.2}-{:.2}",
                assigned_hours, min_hours, max_hours
            ),
        )
    };

    WorkloadReport {
        course_link_id,
        parallel,
        term: term.to_string(),
        is_valid,
        assigned_hours,
        min_hours,
        max_hours,
        message,
    }
}

/// Aggregate load of one instructor in a term.
pub async fn instructor_workload<R: FullRepository + ?Sized>(
    repo: &R,
    instructor_id: InstructorId,
    term: &str,
) -> RepositoryResult<InstructorWorkload> {
    repo.fetch_instructor_workload(instructor_id, term).await
}
