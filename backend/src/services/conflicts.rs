//! Conflict validators.
//!
//! Three independent checks guard the timetable within a term:
//!
//! - **instructor**: nobody teaches two classes at once
//! - **room**: no room hosts two classes at once
//! - **parallel group**: one student cohort (curriculum, semester, parallel)
//!   never attends two classes at once
//!
//! Every check always runs so the caller sees each violated rule in one
//! pass. Each failing check contributes exactly one [`ConflictDetail`]
//! listing the committed rows it collides with.

use log::debug;

use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{
    Assignment, AssignmentFilter, AssignmentId, ConflictDetail, ConflictKind, ValidationResult,
};

/// Run every conflict check for `candidate`.
///
/// `excluding` removes one committed row from consideration, which is how
/// an update is validated against everything except its own prior state.
pub async fn validate_assignment<R: FullRepository + ?Sized>(
    repo: &R,
    candidate: &Assignment,
    excluding: Option<AssignmentId>,
) -> RepositoryResult<ValidationResult> {
    let instructor = check_instructor(repo, candidate, excluding).await?;
    let room = check_room(repo, candidate, excluding).await?;
    let parallel = check_parallel_group(repo, candidate, excluding).await?;

    let conflicts: Vec<ConflictDetail> = [instructor, room, parallel]
        .into_iter()
        .flatten()
        .collect();

    debug!(
        "Validated {} for instructor {} room {}: {} conflict(s)",
        candidate.slot(),
        candidate.instructor_id,
        candidate.room_id,
        conflicts.len()
    );

    Ok(ValidationResult::from_conflicts(conflicts))
}

/// Instructor double-booking within the candidate's term and day.
pub async fn check_instructor<R: FullRepository + ?Sized>(
    repo: &R,
    candidate: &Assignment,
    excluding: Option<AssignmentId>,
) -> RepositoryResult<Option<ConflictDetail>> {
    let filter = AssignmentFilter {
        instructor_id: Some(candidate.instructor_id),
        ..same_day(candidate, excluding)
    };
    let colliding = colliding_rows(repo.find_assignments(&filter).await?, candidate);

    Ok((!colliding.is_empty()).then(|| {
        ConflictDetail::new(
            ConflictKind::Instructor,
            format!(
                "Instructor {} already teaches during {} in term {}",
                candidate.instructor_id,
                candidate.slot(),
                candidate.term
            ),
        )
        .with_conflicting(colliding)
    }))
}

/// Room double-booking within the candidate's term and day.
pub async fn check_room<R: FullRepository + ?Sized>(
    repo: &R,
    candidate: &Assignment,
    excluding: Option<AssignmentId>,
) -> RepositoryResult<Option<ConflictDetail>> {
    let filter = AssignmentFilter {
        room_id: Some(candidate.room_id),
        ..same_day(candidate, excluding)
    };
    let colliding = colliding_rows(repo.find_assignments(&filter).await?, candidate);

    Ok((!colliding.is_empty()).then(|| {
        ConflictDetail::new(
            ConflictKind::Room,
            format!(
                "Room {} is already occupied during {} in term {}",
                candidate.room_id,
                candidate.slot(),
                candidate.term
            ),
        )
        .with_conflicting(colliding)
    }))
}

/// Cohort clash: same curriculum, semester and parallel.
///
/// The curriculum and semester come from the candidate's course link, so a
/// missing link surfaces as `NotFound`.
pub async fn check_parallel_group<R: FullRepository + ?Sized>(
    repo: &R,
    candidate: &Assignment,
    excluding: Option<AssignmentId>,
) -> RepositoryResult<Option<ConflictDetail>> {
    let link = repo.get_course_link(candidate.course_link_id).await?;
    let filter = AssignmentFilter {
        curriculum_id: Some(link.curriculum_id),
        semester: Some(link.semester),
        parallel: Some(candidate.parallel),
        ..same_day(candidate, excluding)
    };
    let colliding = colliding_rows(repo.find_assignments(&filter).await?, candidate);

    Ok((!colliding.is_empty()).then(|| {
        ConflictDetail::new(
            ConflictKind::ParallelGroup,
            format!(
                "Parallel {} of semester {} in {} already has a class during {}",
                candidate.parallel,
                link.semester,
                link.curriculum_name,
                candidate.slot()
            ),
        )
        .with_conflicting(colliding)
    }))
}

fn same_day(candidate: &Assignment, excluding: Option<AssignmentId>) -> AssignmentFilter {
    AssignmentFilter {
        term: Some(candidate.term.clone()),
        day: Some(candidate.day),
        exclude_id: excluding,
        ..Default::default()
    }
}

/// Rows whose slot intersects the candidate's. Series membership grants no
/// exemption: two rows of one series in the same slot still double-book.
fn colliding_rows(rows: Vec<Assignment>, candidate: &Assignment) -> Vec<Assignment> {
    let slot = candidate.slot();
    rows.into_iter()
        .filter(|row| row.slot().collides_with(&slot))
        .collect()
}
