// src/web/admin_handlers.rs
use askama::Template;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde_json::json;

use crate::{
    error::AppResult,
    models::reservation::{
        BulkApprovePayload, ReservationEditPayload, ReservationFilter, StatusUpdatePayload,
    },
    services::reservation_service,
    state::AppState,
    templates::AdminReservationsPage,
};

pub async fn reservations_page(
    State(state): State<AppState>,
    Query(filter): Query<ReservationFilter>,
) -> AppResult<impl IntoResponse> {
    let reservations = reservation_service::list_reservations(&state.db_pool, &filter).await?;
    let template = AdminReservationsPage {
        reservations,
        message: None,
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("failed to render reservations page: {}", e);
            Ok((StatusCode::INTERNAL_SERVER_ERROR, "Page error.").into_response())
        }
    }
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Query(filter): Query<ReservationFilter>,
) -> AppResult<impl IntoResponse> {
    let reservations = reservation_service::list_reservations(&state.db_pool, &filter).await?;
    Ok(Json(reservations))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let reservation = reservation_service::find_reservation(&state.db_pool, &id).await?;
    Ok(Json(reservation))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdatePayload>,
) -> AppResult<impl IntoResponse> {
    reservation_service::update_status(&state.db_pool, &id, &payload.status).await?;
    Ok(Json(json!({ "updated": id })))
}

pub async fn edit_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ReservationEditPayload>,
) -> AppResult<impl IntoResponse> {
    reservation_service::edit_reservation(&state.db_pool, &id, &payload).await?;
    Ok(Json(json!({ "updated": id })))
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    reservation_service::delete_reservation(&state.db_pool, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn bulk_approve(
    State(state): State<AppState>,
    Json(payload): Json<BulkApprovePayload>,
) -> AppResult<impl IntoResponse> {
    let message = reservation_service::bulk_approve(&state.db_pool, &payload.ids).await?;
    Ok(Json(json!({ "message": message })))
}
