// src/state.rs
use sqlx::SqlitePool;

use crate::services::policy::PolicyConfig;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub policy: PolicyConfig,
}

// Lets handlers extract the pool directly where the full state is not needed.
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for PolicyConfig {
    fn from_ref(state: &AppState) -> PolicyConfig {
        state.policy.clone()
    }
}
