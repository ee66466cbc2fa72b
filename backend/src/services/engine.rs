//! Caller-facing facade over the scheduling services.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::lifecycle::WriteGate;
use super::{conflict_log, conflicts, lifecycle, replication, workload};
use crate::db::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    Assignment, AssignmentFilter, AssignmentId, AssignmentPatch, ConflictLogEntry, ConflictLogId,
    CourseLinkId, DeleteOutcome, InstructorId, InstructorWorkload, ReplicationResult,
    ValidationResult, WorkloadReport, WriteOutcome,
};

/// Engine behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hold a process-wide lock across validate-and-commit for create and
    /// update. Only callers sharing this engine are serialized.
    #[serde(default)]
    pub serialize_writes: bool,
}

/// The conflict validation and replication engine.
///
/// Holds the store it was built with and nothing else: no assignment state
/// is cached between calls.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use academic_scheduler::db::LocalRepository;
/// use academic_scheduler::services::{EngineConfig, SchedulingEngine};
///
/// let engine = SchedulingEngine::new(Arc::new(LocalRepository::new()), EngineConfig::default());
/// assert!(!engine.config().serialize_writes);
/// ```
pub struct SchedulingEngine {
    repo: Arc<dyn FullRepository>,
    gate: WriteGate,
    config: EngineConfig,
}

impl SchedulingEngine {
    pub fn new(repo: Arc<dyn FullRepository>, config: EngineConfig) -> Self {
        let gate = if config.serialize_writes {
            WriteGate::serialized()
        } else {
            WriteGate::open()
        };
        Self { repo, gate, config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// The injected store.
    pub fn repository(&self) -> &Arc<dyn FullRepository> {
        &self.repo
    }

    pub async fn health_check(&self) -> RepositoryResult<bool> {
        self.repo.health_check().await
    }

    /// Run the conflict validators without writing anything.
    pub async fn validate(
        &self,
        candidate: &Assignment,
        excluding: Option<AssignmentId>,
    ) -> RepositoryResult<ValidationResult> {
        candidate.check_well_formed().map_err(|msg| {
            RepositoryError::validation_with_context(
                msg,
                ErrorContext::new("validate_assignment").with_entity("assignment"),
            )
        })?;
        conflicts::validate_assignment(self.repo.as_ref(), candidate, excluding).await
    }

    pub async fn create(&self, candidate: Assignment) -> RepositoryResult<WriteOutcome<Assignment>> {
        lifecycle::create(self.repo.as_ref(), &self.gate, candidate).await
    }

    pub async fn update(
        &self,
        id: AssignmentId,
        patch: &AssignmentPatch,
        apply_to_series: bool,
    ) -> RepositoryResult<WriteOutcome<Vec<Assignment>>> {
        lifecycle::update(self.repo.as_ref(), &self.gate, id, patch, apply_to_series).await
    }

    pub async fn delete(
        &self,
        id: AssignmentId,
        delete_series: bool,
    ) -> RepositoryResult<DeleteOutcome> {
        lifecycle::delete(self.repo.as_ref(), id, delete_series).await
    }

    pub async fn replicate(&self, base: &Assignment) -> RepositoryResult<ReplicationResult> {
        replication::replicate(self.repo.as_ref(), &self.gate, base).await
    }

    pub async fn validate_workload(
        &self,
        course_link_id: CourseLinkId,
        parallel: i32,
        term: &str,
    ) -> RepositoryResult<WorkloadReport> {
        workload::validate_workload(self.repo.as_ref(), course_link_id, parallel, term).await
    }

    /// Committed assignments matching `filter`, ordered by day, start time
    /// and id. The term is mandatory.
    pub async fn list_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> RepositoryResult<Vec<Assignment>> {
        if filter.term.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(RepositoryError::validation_with_context(
                "term is required to list assignments",
                ErrorContext::new("list_assignments"),
            ));
        }
        self.repo.find_assignments(filter).await
    }

    pub async fn instructor_workload(
        &self,
        instructor_id: InstructorId,
        term: &str,
    ) -> RepositoryResult<InstructorWorkload> {
        workload::instructor_workload(self.repo.as_ref(), instructor_id, term).await
    }

    pub async fn list_pending_conflicts(&self) -> RepositoryResult<Vec<ConflictLogEntry>> {
        conflict_log::list_pending(self.repo.as_ref()).await
    }

    pub async fn resolve_conflict(
        &self,
        id: ConflictLogId,
        resolution: &str,
    ) -> RepositoryResult<ConflictLogEntry> {
        conflict_log::resolve(self.repo.as_ref(), id, resolution).await
    }
}

impl std::fmt::Debug for SchedulingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulingEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;

    #[tokio::test]
    async fn test_list_requires_term() {
        let engine = SchedulingEngine::new(Arc::new(LocalRepository::new()), EngineConfig::default());
        let err = engine
            .list_assignments(&AssignmentFilter::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid-input");
        assert!(engine
            .list_assignments(&AssignmentFilter::for_term("2025-1"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_serialize_writes_switch() {
        let engine = SchedulingEngine::new(
            Arc::new(LocalRepository::new()),
            EngineConfig {
                serialize_writes: true,
            },
        );
        assert!(engine.gate.is_serialized());
        assert!(engine.health_check().await.unwrap());
    }
}
