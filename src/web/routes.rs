// src/web/routes.rs
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    state::AppState,
    web::{admin_handlers, auth_handlers, booking_handlers, mw_admin},
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Public reads: boat config, tours, availability ---
    let api_routes = Router::new()
        .route("/boats", get(booking_handlers::list_boats))
        .route("/boats/{id}", get(booking_handlers::get_boat))
        .route("/boats/{id}/calendar", get(booking_handlers::month_availability))
        .route("/boats/{id}/slots", get(booking_handlers::day_availability))
        .route("/tours", get(booking_handlers::list_tours));

    // --- The booking wizard, one route per transition ---
    let booking_routes = Router::new()
        .route("/", get(booking_handlers::current_draft))
        .route("/start", post(booking_handlers::start_booking))
        .route("/tour-type", post(booking_handlers::select_tour_type))
        .route("/party", post(booking_handlers::select_party))
        .route("/date", post(booking_handlers::select_date))
        .route("/slot", post(booking_handlers::select_slot))
        .route("/seats/toggle", post(booking_handlers::toggle_seat))
        .route("/contact", post(booking_handlers::set_contact))
        .route("/back", post(booking_handlers::go_back))
        .route("/submit", post(booking_handlers::submit))
        .route("/reset", post(booking_handlers::reset));

    // --- Admin back-office, behind the session gate ---
    let admin_routes = Router::new()
        .route("/reservations", get(admin_handlers::reservations_page))
        .route("/api/reservations", get(admin_handlers::list_reservations))
        .route(
            "/api/reservations/bulk-approve",
            post(admin_handlers::bulk_approve),
        )
        .route(
            "/api/reservations/{id}",
            get(admin_handlers::get_reservation)
                .post(admin_handlers::edit_reservation)
                .delete(admin_handlers::delete_reservation),
        )
        .route(
            "/api/reservations/{id}/status",
            post(admin_handlers::update_status),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_admin::require_admin,
        ));

    Router::new()
        .route("/", get(booking_handlers::booking_page))
        .route(
            "/admin/login",
            get(auth_handlers::show_login_form).post(auth_handlers::handle_login),
        )
        .route("/admin/logout", get(auth_handlers::handle_logout))
        .nest("/api", api_routes)
        .nest("/booking", booking_routes)
        .nest("/admin", admin_routes)
        .with_state(app_state)
}
