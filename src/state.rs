// src/state.rs

use crate::config::Config;
use crate::services::{identity::IdentityClient, storage::StorageClient};
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub identity: IdentityClient,
    pub storage: StorageClient,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for IdentityClient {
    fn from_ref(state: &AppState) -> Self {
        state.identity.clone()
    }
}

impl FromRef<AppState> for StorageClient {
    fn from_ref(state: &AppState) -> Self {
        state.storage.clone()
    }
}
