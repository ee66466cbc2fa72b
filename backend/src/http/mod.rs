//! HTTP surface for the scheduling engine.
//!
//! An axum server that exposes the engine operations as a JSON REST API.
//! Handlers stay thin: they decode requests, call the
//! [`SchedulingEngine`](crate::services::SchedulingEngine) held in
//! [`AppState`] and wrap results in the [`ApiResponse`](crate::api::ApiResponse)
//! envelope.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query / JSON decoding                                  │
//! │  - Envelope + status code mapping                         │
//! │  - CORS, compression, request tracing                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Engine (services/)                                       │
//! │  - Conflict validation, lifecycle, replication            │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
