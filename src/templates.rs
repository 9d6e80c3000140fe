// src/templates.rs
use askama::Template;

use crate::models::reservation::Reservation;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub error: Option<String>,
}

/// Summary row for the landing page boat picker.
pub struct BoatSummary {
    pub id: String,
    pub name: String,
    pub capacity: i64,
}

#[derive(Template)]
#[template(path = "booking.html")]
pub struct BookingPage {
    pub boats: Vec<BoatSummary>,
}

#[derive(Template)]
#[template(path = "admin_reservations.html")]
pub struct AdminReservationsPage {
    pub reservations: Vec<Reservation>,
    pub message: Option<String>,
}
