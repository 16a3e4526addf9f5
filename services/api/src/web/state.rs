//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use routine_tracker_core::ports::RecordRepository;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn RecordRepository>,
    pub config: Arc<Config>,
}
