// src/error.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("database migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),

    #[error("environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A selection-step guard failed. The draft does not advance; the user
    /// can retry with corrected input.
    #[error("{0}")]
    Validation(String),

    /// The submit recheck found the selection no longer bookable. The user
    /// is sent back to slot/seat selection with refreshed occupancy.
    #[error("{0}")]
    CapacityConflict(String),

    /// A boat has no slots configured, a custom tour went inactive, or a
    /// referenced record is missing. Not retried automatically.
    #[error("{0}")]
    ConfigurationAbsent(String),

    #[error("password verification failed")]
    PasswordHashing,

    #[error("session error: {0}")]
    Session(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Full detail stays in the server log; the client gets a stable
        // error code and a displayable message.
        tracing::error!("request failed: {:?}", self);

        let (status, code, message) = match &self {
            AppError::Sqlx(_) | AppError::SqlxMigrate(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_unavailable",
                "The reservation store is unavailable. Please try again.".to_string(),
            ),
            AppError::EnvVar(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration",
                "Server configuration error.".to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg.clone())
            }
            AppError::CapacityConflict(msg) => {
                (StatusCode::CONFLICT, "capacity_conflict", msg.clone())
            }
            AppError::ConfigurationAbsent(msg) => {
                (StatusCode::NOT_FOUND, "configuration_absent", msg.clone())
            }
            AppError::PasswordHashing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "auth",
                "Could not verify credentials.".to_string(),
            ),
            AppError::Session(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "session",
                "Session handling failed.".to_string(),
            ),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

pub type AppResult<T = ()> = Result<T, AppError>;
