// src/web/auth_handlers.rs
use askama::Template;
use axum::{
    extract::Form,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    error::{AppError, AppResult},
    services::auth_service,
    templates::LoginPage,
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub password: String,
}

pub async fn show_login_form(session: Session) -> impl IntoResponse {
    if session.get::<bool>("is_admin").await.ok().flatten() == Some(true) {
        return Redirect::to("/admin/reservations").into_response();
    }
    let template = LoginPage { error: None };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("failed to render login page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Page error.").into_response()
        }
    }
}

pub async fn handle_login(
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    if auth_service::verify_admin_password(&form.password).await? {
        // New session id on privilege change.
        session
            .cycle_id()
            .await
            .map_err(|e| AppError::Session(format!("failed to cycle session id: {}", e)))?;
        session
            .insert("is_admin", true)
            .await
            .map_err(|e| AppError::Session(format!("failed to store admin flag: {}", e)))?;
        tracing::info!("admin logged in");
        return Ok(Redirect::to("/admin/reservations").into_response());
    }

    tracing::warn!("failed admin login attempt");
    let template = LoginPage {
        error: Some("Invalid password.".to_string()),
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("failed to render login page: {}", e);
            Err(AppError::Session("render failure".into()))
        }
    }
}

pub async fn handle_logout(session: Session) -> AppResult<Redirect> {
    session
        .delete()
        .await
        .map_err(|e| AppError::Session(format!("failed to delete session: {}", e)))?;
    tracing::info!("admin logged out");
    Ok(Redirect::to("/admin/login"))
}
