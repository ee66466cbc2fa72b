//! Store contract consumed by the scheduling engine.
//!
//! The engine never talks to a database directly. It is handed an
//! implementation of these traits at construction time and orchestrates
//! calls to it. Responsibilities are split so test doubles can stay small:
//!
//! - [`assignment`]: query-by-filter, insert, update-by-selector, delete-by-selector
//! - [`curriculum`]: course-curriculum links and declared equivalences
//! - [`workload`]: server-side weekly-hours computations
//! - [`conflict_log`]: append-only conflict log plus the resolution workflow
//! - [`error`]: error types shared by all of the above
//!
//! # Consistency
//!
//! Nothing in this contract enforces the no-overlap invariants. The engine
//! validates first and writes afterwards as two separate calls, so two
//! concurrent writers can both pass validation against the same snapshot.

pub mod assignment;
pub mod conflict_log;
pub mod curriculum;
pub mod error;
pub mod workload;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use assignment::AssignmentRepository;
pub use conflict_log::ConflictLogRepository;
pub use curriculum::CurriculumRepository;
pub use workload::WorkloadRepository;

/// Composite bound for a store that satisfies the whole contract.
///
/// Implemented automatically for any type implementing the four traits.
pub trait FullRepository:
    AssignmentRepository + CurriculumRepository + WorkloadRepository + ConflictLogRepository
{
}

impl<T> FullRepository for T where
    T: AssignmentRepository + CurriculumRepository + WorkloadRepository + ConflictLogRepository
{
}
