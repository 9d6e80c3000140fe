// src/web/mw_admin.rs
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;

/// Gates the admin surface on the session flag set by the login handler.
pub async fn require_admin(
    session: Session,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match session.get::<bool>("is_admin").await {
        Ok(Some(true)) => Ok(next.run(request).await),
        Ok(_) => {
            tracing::debug!("admin MW: no admin session, redirecting to login");
            Ok(Redirect::to("/admin/login").into_response())
        }
        Err(e) => {
            tracing::error!("admin MW: failed to read session: {:?}", e);
            Err(AppError::Session(format!("failed to read session: {}", e)))
        }
    }
}
