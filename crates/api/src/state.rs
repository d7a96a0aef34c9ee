use std::sync::Arc;

use planograph_store::{FileStore, ProjectLocks, ProjectStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Entity/link/concept document store, also the render-meta provider.
    pub store: Arc<FileStore>,
    /// Project manifest store.
    pub projects: Arc<ProjectStore>,
    /// Per-project mutation locks serializing load→mutate→save cycles.
    pub locks: Arc<ProjectLocks>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Build the application state from configuration.
    pub fn from_config(config: ServerConfig) -> Self {
        let data_dir = config.data_dir.clone();
        Self {
            store: Arc::new(FileStore::new(&data_dir)),
            projects: Arc::new(ProjectStore::new(&data_dir)),
            locks: Arc::new(ProjectLocks::new()),
            config: Arc::new(config),
        }
    }
}
