//! Replication of one assignment across equivalent curricula.
//!
//! Best-effort fan-out: the base link and the equivalence list must
//! resolve, after which every target is attempted in lookup order and its
//! outcome recorded, whatever happened to the previous one.

use log::{info, warn};

use super::lifecycle::{self, WriteGate};
use crate::db::repository::{FullRepository, RepositoryResult};
use crate::models::{
    Assignment, CourseLink, Equivalence, ReplicationResult, ReplicationTarget, SeriesId,
    WriteOutcome,
};

/// Replicate `base` into every curriculum that declares its course code
/// equivalent.
///
/// All replicas share one series id: the base's, or a fresh one when the
/// base has none. Every equivalence row is attempted, the base's own
/// curriculum included.
pub async fn replicate<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &WriteGate,
    base: &Assignment,
) -> RepositoryResult<ReplicationResult> {
    let base_link = repo.get_course_link(base.course_link_id).await?;
    let equivalences = repo.find_equivalences(&base_link.course_code).await?;
    let series_id = base.series_id.unwrap_or_else(SeriesId::generate);

    let mut details = Vec::with_capacity(equivalences.len());
    for target in &equivalences {
        let error = replicate_one(repo, gate, base, &base_link, target, series_id)
            .await
            .err();
        if let Some(ref reason) = error {
            warn!(
                "Replication of {} into {} failed: {}",
                base_link.course_code, target.curriculum_name, reason
            );
        }
        details.push(ReplicationTarget {
            curriculum_name: target.curriculum_name.clone(),
            program_name: target.program_name.clone(),
            success: error.is_none(),
            error,
        });
    }

    let result = ReplicationResult::from_targets(details);
    info!(
        "Replicated {} (series {}): {} created, {} failed",
        base_link.course_code, series_id, result.created_count, result.failed_count
    );
    Ok(result)
}

/// One target. Every failure, store errors included, comes back as a
/// printable reason.
async fn replicate_one<R: FullRepository + ?Sized>(
    repo: &R,
    gate: &WriteGate,
    base: &Assignment,
    base_link: &CourseLink,
    target: &Equivalence,
    series_id: SeriesId,
) -> Result<(), String> {
    let target_link = repo
        .find_course_link(target.curriculum_id, &base_link.course_code, base_link.semester)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| {
            format!(
                "no equivalent course {} at semester {} in {}",
                base_link.course_code, base_link.semester, target.curriculum_name
            )
        })?;

    let replica = Assignment {
        id: None,
        course_link_id: target_link.id,
        series_id: Some(series_id),
        ..base.clone()
    };

    match lifecycle::create(repo, gate, replica)
        .await
        .map_err(|e| e.to_string())?
    {
        WriteOutcome::Committed { .. } => Ok(()),
        WriteOutcome::Rejected { conflict } => Err(format!("{}: {}", conflict.kind, conflict.message)),
    }
}
