use std::sync::Arc;

use solicitudes_core::storage::LocalStorage;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: solicitudes_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Document store rooted at `config.media_root`.
    pub storage: LocalStorage,
}

impl AppState {
    pub fn new(pool: solicitudes_db::DbPool, config: ServerConfig) -> Self {
        let storage = LocalStorage::new(config.media_root.clone());
        Self {
            pool,
            config: Arc::new(config),
            storage,
        }
    }
}
