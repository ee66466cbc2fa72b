//! Service layer: the conflict validation and replication engine.
//!
//! Services are free functions over any [`FullRepository`](crate::db::FullRepository);
//! [`SchedulingEngine`] bundles them behind one injected store.
//!
//! - [`overlap`]: half-open interval intersection
//! - [`conflicts`]: instructor, room and parallel-group validators
//! - [`workload`]: advisory weekly-hours checks
//! - [`lifecycle`]: validated create / update / delete
//! - [`replication`]: fan-out across equivalent curricula
//! - [`conflict_log`]: best-effort conflict log and resolution workflow

pub mod conflict_log;
pub mod conflicts;
pub mod engine;
pub mod lifecycle;
pub mod overlap;
pub mod replication;
pub mod workload;

pub use conflicts::validate_assignment;
pub use engine::{EngineConfig, SchedulingEngine};
pub use lifecycle::WriteGate;
pub use overlap::intervals_overlap;
pub use workload::{build_report, validate_workload};
