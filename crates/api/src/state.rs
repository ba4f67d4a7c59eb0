use std::sync::Arc;

use taskflow_db::Store;

use crate::auth::jwt::CredentialService;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Backing store (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
    /// Token issuer/validator, built once from `config.jwt`.
    pub credentials: Arc<CredentialService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        let credentials = Arc::new(CredentialService::new(&config.jwt));
        Self {
            store,
            config: Arc::new(config),
            credentials,
        }
    }
}
