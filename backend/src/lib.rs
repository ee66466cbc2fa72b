//! # Academic Scheduler Backend
//!
//! Conflict validation and replication engine for university timetables.
//!
//! The engine decides whether a proposed class assignment (course section,
//! instructor, room, weekday, time range, term) may be committed without
//! double-booking an instructor, a room or a student cohort, keeps a log of
//! rejected attempts, and fans an assignment out to every curriculum that
//! declares the course equivalent.
//!
//! ## Architecture
//!
//! - [`models`]: typed domain records (assignments, conflicts, workload)
//! - [`db`]: store contract, in-memory and PostgreSQL implementations, config
//! - [`services`]: validators, lifecycle, replication and the [`services::SchedulingEngine`] facade
//! - [`api`]: response envelope shared by every caller-facing surface
//! - [`http`]: Axum-based REST server (feature `http-server`)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use academic_scheduler::db::LocalRepository;
//! use academic_scheduler::services::{EngineConfig, SchedulingEngine};
//!
//! let engine = SchedulingEngine::new(Arc::new(LocalRepository::new()), EngineConfig::default());
//! assert!(!engine.config().serialize_writes);
//! ```

// RepositoryError carries rich context; keep it by value in Results.
#![allow(clippy::result_large_err)]

pub mod api;
pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
