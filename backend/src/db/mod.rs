//! Storage layer for the scheduling engine.
//!
//! The engine consumes the store through the traits in [`repository`] and
//! never holds a global handle: a store is built once (usually through
//! [`RepositoryFactory`]) and handed to `SchedulingEngine::new`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP surface (http) / embedding application           │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  services::SchedulingEngine - validation, lifecycle,    │
//! │  replication, conflict log                              │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │  Arc<dyn FullRepository>
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  repository traits                                      │
//! └─────────┬───────────────────────────────┬───────────────┘
//!           │                               │
//!   repositories::local            repositories::postgres
//!       (in-memory)                  (Diesel, feature-gated)
//! ```
//!
//! # Example
//! ```ignore
//! use academic_scheduler::db::{AppConfig, RepositoryFactory};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let store = RepositoryFactory::from_app_config(&config).await?;
//!     assert!(store.health_check().await?);
//!     Ok(())
//! }
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod config;
pub mod factory;
pub mod repositories;
pub mod repository;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

pub use config::AppConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    AssignmentRepository, ConflictLogRepository, CurriculumRepository, ErrorContext,
    FullRepository, RepositoryError, RepositoryResult, WorkloadRepository,
};
