//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use inventory_core::ports::{DirectoryStore, UserStore};
use inventory_core::service::AssignmentService;

/// The shared application state, created once at startup and passed to all handlers.
///
/// The store handle is threaded through here explicitly; there is no
/// process-wide singleton connection.
#[derive(Clone)]
pub struct AppState {
    pub assignments: Arc<AssignmentService>,
    pub users: Arc<dyn UserStore>,
    pub directory: Arc<dyn DirectoryStore>,
    pub config: Arc<Config>,
}
