//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::SchedulingEngine;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SchedulingEngine>,
}

impl AppState {
    pub fn new(engine: Arc<SchedulingEngine>) -> Self {
        Self { engine }
    }
}
