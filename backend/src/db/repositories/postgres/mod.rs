//! Postgres repository implementation using Diesel.
//!
//! Tables, the `course_workload` SQL function and the `instructor_workload`
//! view are created by the embedded migrations under `migrations/`.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! Store errors are never retried here. Transient failures reach the
//! caller unchanged and the caller owns the retry policy.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::repository::{
    AssignmentRepository, ConflictLogRepository, CurriculumRepository, ErrorContext,
    RepositoryError, RepositoryResult, WorkloadRepository,
};
use crate::models::{
    Assignment, AssignmentFilter, AssignmentId, AssignmentPatch, AssignmentSelector,
    ConflictLogEntry, ConflictLogId, CourseLink, CourseLinkId, CurriculumId, Equivalence,
    InstructorId, InstructorWorkload, NewConflictLogEntry, ProgramId, WorkloadFigures,
};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// (link id, course code, semester, curriculum id, curriculum name, program id, program name)
type CourseLinkTuple = (i64, String, i32, i64, String, i64, String);

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
    /// - `PG_POOL_MAX`: Maximum pool size (default: 10)
    /// - `PG_POOL_MIN`: Minimum pool size (default: 1)
    /// - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    /// - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_or("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_or("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_or("PG_CONN_TIMEOUT_SEC", defaults.connection_timeout_sec),
            idle_timeout_sec: env_or("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    ///
    /// # Returns
    /// * `Ok(PostgresRepository)` on success
    /// * `Err(RepositoryError)` if connection or migration fails
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run one blocking Diesel operation on a pooled connection.
    ///
    /// Exactly one attempt is made.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).retryable(),
                )
            })?;

            total_queries.fetch_add(1, Ordering::Relaxed);
            f(&mut conn).map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                e.with_operation(operation)
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
        }
    }

    /// Get detailed health information.
    ///
    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(healthy) => (healthy, Some(start.elapsed().as_millis() as u64), None),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn rows_to_assignments(rows: Vec<AssignmentRow>) -> RepositoryResult<Vec<Assignment>> {
    rows.into_iter().map(Assignment::try_from).collect()
}

fn tuple_to_course_link(t: CourseLinkTuple) -> CourseLink {
    CourseLink {
        id: CourseLinkId(t.0),
        course_code: t.1,
        semester: t.2,
        curriculum_id: CurriculumId(t.3),
        curriculum_name: t.4,
        program_id: ProgramId(t.5),
        program_name: t.6,
    }
}

fn load_selected(
    conn: &mut PgConnection,
    selector: AssignmentSelector,
) -> RepositoryResult<Vec<AssignmentRow>> {
    let query = assignments::table.select(AssignmentRow::as_select());
    match selector {
        AssignmentSelector::ById(id) => query
            .filter(assignments::id.eq(id.value()))
            .load::<AssignmentRow>(conn),
        AssignmentSelector::BySeries(series) => query
            .filter(assignments::series_id.eq(series.value()))
            .load::<AssignmentRow>(conn),
    }
    .map_err(map_diesel_error)
}

fn selector_not_found(selector: AssignmentSelector) -> RepositoryError {
    match selector {
        AssignmentSelector::ById(id) => RepositoryError::not_found_with_context(
            format!("Assignment {} not found", id),
            ErrorContext::default()
                .with_entity("assignment")
                .with_entity_id(id),
        ),
        AssignmentSelector::BySeries(series) => RepositoryError::not_found_with_context(
            format!("Series {} has no assignments", series),
            ErrorContext::default()
                .with_entity("series")
                .with_entity_id(series),
        ),
    }
}

#[async_trait]
impl AssignmentRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_assignment(&self, id: AssignmentId) -> RepositoryResult<Assignment> {
        self.with_conn("get_assignment", move |conn| {
            let row = assignments::table
                .filter(assignments::id.eq(id.value()))
                .select(AssignmentRow::as_select())
                .first::<AssignmentRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| selector_not_found(AssignmentSelector::ById(id)))?;
            Assignment::try_from(row)
        })
        .await
    }

    async fn find_assignments(
        &self,
        filter: &AssignmentFilter,
    ) -> RepositoryResult<Vec<Assignment>> {
        let filter = filter.clone();
        self.with_conn("find_assignments", move |conn| {
            let mut query = assignments::table
                .inner_join(course_links::table.inner_join(curricula::table))
                .select(AssignmentRow::as_select())
                .into_boxed();

            if let Some(term) = filter.term {
                query = query.filter(assignments::term.eq(term));
            }
            if let Some(v) = filter.instructor_id {
                query = query.filter(assignments::instructor_id.eq(v.value()));
            }
            if let Some(v) = filter.room_id {
                query = query.filter(assignments::room_id.eq(v.value()));
            }
            if let Some(day) = filter.day {
                query = query.filter(assignments::day_of_week.eq(day.number() as i16));
            }
            if let Some(v) = filter.parallel {
                query = query.filter(assignments::parallel.eq(v));
            }
            if let Some(v) = filter.series_id {
                query = query.filter(assignments::series_id.eq(v.value()));
            }
            if let Some(v) = filter.course_link_id {
                query = query.filter(assignments::course_link_id.eq(v.value()));
            }
            if let Some(v) = filter.curriculum_id {
                query = query.filter(course_links::curriculum_id.eq(v.value()));
            }
            if let Some(v) = filter.program_id {
                query = query.filter(curricula::program_id.eq(v.value()));
            }
            if let Some(v) = filter.semester {
                query = query.filter(course_links::semester.eq(v));
            }
            if let Some(v) = filter.exclude_id {
                query = query.filter(assignments::id.ne(v.value()));
            }

            let rows = query
                .order((
                    assignments::day_of_week.asc(),
                    assignments::start_time.asc(),
                    assignments::id.asc(),
                ))
                .load::<AssignmentRow>(conn)
                .map_err(map_diesel_error)?;
            rows_to_assignments(rows)
        })
        .await
    }

    async fn insert_assignment(&self, assignment: &Assignment) -> RepositoryResult<Assignment> {
        let new_row = NewAssignmentRow::from(assignment);
        self.with_conn("insert_assignment", move |conn| {
            let row = diesel::insert_into(assignments::table)
                .values(&new_row)
                .returning(AssignmentRow::as_returning())
                .get_result::<AssignmentRow>(conn)
                .map_err(map_diesel_error)?;
            Assignment::try_from(row)
        })
        .await
    }

    async fn update_assignments(
        &self,
        selector: AssignmentSelector,
        patch: &AssignmentPatch,
    ) -> RepositoryResult<Vec<Assignment>> {
        let changes = AssignmentChangeset::from(patch);
        self.with_conn("update_assignments", move |conn| {
            conn.transaction(|tx| {
                // Diesel refuses an empty SET clause.
                let rows = if changes.is_noop() {
                    load_selected(tx, selector)?
                } else {
                    match selector {
                        AssignmentSelector::ById(id) => diesel::update(
                            assignments::table.filter(assignments::id.eq(id.value())),
                        )
                        .set(&changes)
                        .returning(AssignmentRow::as_returning())
                        .get_results::<AssignmentRow>(tx),
                        AssignmentSelector::BySeries(series) => diesel::update(
                            assignments::table.filter(assignments::series_id.eq(series.value())),
                        )
                        .set(&changes)
                        .returning(AssignmentRow::as_returning())
                        .get_results::<AssignmentRow>(tx),
                    }
                    .map_err(map_diesel_error)?
                };

                if rows.is_empty() {
                    return Err(selector_not_found(selector));
                }
                rows_to_assignments(rows)
            })
        })
        .await
    }

    async fn delete_assignments(&self, selector: AssignmentSelector) -> RepositoryResult<u64> {
        self.with_conn("delete_assignments", move |conn| {
            let deleted = match selector {
                AssignmentSelector::ById(id) => {
                    diesel::delete(assignments::table.filter(assignments::id.eq(id.value())))
                        .execute(conn)
                }
                AssignmentSelector::BySeries(series) => diesel::delete(
                    assignments::table.filter(assignments::series_id.eq(series.value())),
                )
                .execute(conn),
            }
            .map_err(map_diesel_error)?;
            Ok(deleted as u64)
        })
        .await
    }
}

#[async_trait]
impl CurriculumRepository for PostgresRepository {
    async fn get_course_link(&self, id: CourseLinkId) -> RepositoryResult<CourseLink> {
        self.with_conn("get_course_link", move |conn| {
            course_links::table
                .inner_join(curricula::table.inner_join(programs::table))
                .filter(course_links::id.eq(id.value()))
                .select((
                    course_links::id,
                    course_links::course_code,
                    course_links::semester,
                    curricula::id,
                    curricula::name,
                    programs::id,
                    programs::name,
                ))
                .first::<CourseLinkTuple>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(tuple_to_course_link)
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Course link {} not found", id),
                        ErrorContext::default()
                            .with_entity("course_link")
                            .with_entity_id(id),
                    )
                })
        })
        .await
    }

    async fn find_course_link(
        &self,
        curriculum_id: CurriculumId,
        course_code: &str,
        semester: i32,
    ) -> RepositoryResult<Option<CourseLink>> {
        let course_code = course_code.to_string();
        self.with_conn("find_course_link", move |conn| {
            let found = course_links::table
                .inner_join(curricula::table.inner_join(programs::table))
                .filter(course_links::curriculum_id.eq(curriculum_id.value()))
                .filter(course_links::course_code.eq(course_code))
                .filter(course_links::semester.eq(semester))
                .order(course_links::id.asc())
                .select((
                    course_links::id,
                    course_links::course_code,
                    course_links::semester,
                    curricula::id,
                    curricula::name,
                    programs::id,
                    programs::name,
                ))
                .first::<CourseLinkTuple>(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Ok(found.map(tuple_to_course_link))
        })
        .await
    }

    async fn find_equivalences(&self, course_code: &str) -> RepositoryResult<Vec<Equivalence>> {
        let course_code = course_code.to_string();
        self.with_conn("find_equivalences", move |conn| {
            let rows: Vec<(String, i64, String, String)> = course_equivalences::table
                .inner_join(curricula::table.inner_join(programs::table))
                .filter(course_equivalences::canonical_code.eq(course_code))
                .order(course_equivalences::id.asc())
                .select((
                    course_equivalences::canonical_code,
                    curricula::id,
                    curricula::name,
                    programs::name,
                ))
                .load(conn)
                .map_err(map_diesel_error)?;

            Ok(rows
                .into_iter()
                .map(|(code, curriculum_id, curriculum_name, program_name)| Equivalence {
                    course_code: code,
                    curriculum_id: CurriculumId(curriculum_id),
                    curriculum_name,
                    program_name,
                })
                .collect())
        })
        .await
    }
}

#[async_trait]
impl WorkloadRepository for PostgresRepository {
    async fn compute_course_workload(
        &self,
        course_link_id: CourseLinkId,
        parallel: i32,
        term: &str,
    ) -> RepositoryResult<WorkloadFigures> {
        let term = term.to_string();
        self.with_conn("compute_course_workload", move |conn| {
            let row = sql_query(
                "SELECT assigned_hours, min_hours, max_hours FROM course_workload($1, $2, $3)",
            )
            .bind::<BigInt, _>(course_link_id.value())
            .bind::<Integer, _>(parallel)
            .bind::<Text, _>(term)
            .get_result::<CourseWorkloadRow>(conn)
            .optional()
            .map_err(map_diesel_error)?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Course link {} not found", course_link_id),
                    ErrorContext::default()
                        .with_entity("course_link")
                        .with_entity_id(course_link_id),
                )
            })?;

            Ok(WorkloadFigures {
                assigned_hours: row.assigned_hours,
                min_hours: row.min_hours,
                max_hours: row.max_hours,
            })
        })
        .await
    }

    async fn fetch_instructor_workload(
        &self,
        instructor_id: InstructorId,
        term: &str,
    ) -> RepositoryResult<InstructorWorkload> {
        let term = term.to_string();
        self.with_conn("fetch_instructor_workload", move |conn| {
            let row = sql_query(
                "SELECT assignment_count, course_count, weekly_hours \
                 FROM instructor_workload WHERE instructor_id = $1 AND term = $2",
            )
            .bind::<BigInt, _>(instructor_id.value())
            .bind::<Text, _>(term.clone())
            .get_result::<InstructorWorkloadRow>(conn)
            .optional()
            .map_err(map_diesel_error)?;

            // An instructor with nothing scheduled has no row in the view.
            Ok(match row {
                Some(r) => InstructorWorkload {
                    instructor_id,
                    term,
                    assignment_count: r.assignment_count as usize,
                    course_count: r.course_count as usize,
                    weekly_hours: r.weekly_hours,
                },
                None => InstructorWorkload {
                    instructor_id,
                    term,
                    assignment_count: 0,
                    course_count: 0,
                    weekly_hours: 0.0,
                },
            })
        })
        .await
    }
}

#[async_trait]
impl ConflictLogRepository for PostgresRepository {
    async fn append_conflict(
        &self,
        entry: &NewConflictLogEntry,
    ) -> RepositoryResult<ConflictLogEntry> {
        let new_row = NewConflictLogRow::from(entry);
        self.with_conn("append_conflict", move |conn| {
            let row = diesel::insert_into(conflict_log::table)
                .values(&new_row)
                .returning(ConflictLogRow::as_returning())
                .get_result::<ConflictLogRow>(conn)
                .map_err(map_diesel_error)?;
            ConflictLogEntry::try_from(row)
        })
        .await
    }

    async fn list_pending_conflicts(&self) -> RepositoryResult<Vec<ConflictLogEntry>> {
        self.with_conn("list_pending_conflicts", |conn| {
            let rows = conflict_log::table
                .filter(conflict_log::resolved.eq(false))
                .order((conflict_log::detected_at.desc(), conflict_log::id.desc()))
                .select(ConflictLogRow::as_select())
                .load::<ConflictLogRow>(conn)
                .map_err(map_diesel_error)?;
            rows.into_iter().map(ConflictLogEntry::try_from).collect()
        })
        .await
    }

    async fn resolve_conflict(
        &self,
        id: ConflictLogId,
        resolution: &str,
        resolved_at: DateTime<Utc>,
    ) -> RepositoryResult<ConflictLogEntry> {
        let resolution = resolution.to_string();
        self.with_conn("resolve_conflict", move |conn| {
            let row = diesel::update(conflict_log::table.filter(conflict_log::id.eq(id.value())))
                .set((
                    conflict_log::resolved.eq(true),
                    conflict_log::resolution.eq(Some(resolution)),
                    conflict_log::resolved_at.eq(Some(resolved_at)),
                ))
                .returning(ConflictLogRow::as_returning())
                .get_result::<ConflictLogRow>(conn)
                .optional()
                .map_err(map_diesel_error)?
                .ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Conflict log entry {} not found", id),
                        ErrorContext::default()
                            .with_entity("conflict_log")
                            .with_entity_id(id),
                    )
                })?;
            ConflictLogEntry::try_from(row)
        })
        .await
    }
}
