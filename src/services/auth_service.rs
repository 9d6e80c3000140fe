// src/services/auth_service.rs
use crate::error::{AppError, AppResult};

/// Checks the supplied admin password against the bcrypt hash in
/// `ADMIN_PASSWORD_HASH`. Runs on the blocking pool; bcrypt is deliberately
/// slow.
pub async fn verify_admin_password(password: &str) -> AppResult<bool> {
    let stored_hash = std::env::var("ADMIN_PASSWORD_HASH")?;
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &stored_hash))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking failed in verify_admin_password: {:?}", e);
            AppError::PasswordHashing
        })?
        .map_err(|e| {
            tracing::error!("bcrypt verification error: {:?}", e);
            AppError::PasswordHashing
        })
}
