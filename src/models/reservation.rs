// src/models/reservation.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::tour::TourType;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_COMPLETED: &str = "completed";

pub const ALL_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_CONFIRMED,
    STATUS_CANCELLED,
    STATUS_COMPLETED,
];

/// The slim row shape occupancy is computed from: one reservation's seats,
/// status and tour type. This is the read contract of the store boundary.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReservationRow {
    pub id: String,
    pub selected_seats: String, // JSON int array
    pub status: String,
    pub tour_type: String,
}

impl ReservationRow {
    /// Active rows are the only ones that hold seats. `cancelled` and
    /// `completed` contribute nothing to occupancy.
    pub fn is_active(&self) -> bool {
        self.status == STATUS_PENDING || self.status == STATUS_CONFIRMED
    }

    pub fn is_exclusive(&self) -> bool {
        TourType::parse(&self.tour_type).is_exclusive()
    }

    pub fn seats(&self) -> Vec<i64> {
        serde_json::from_str(&self.selected_seats).unwrap_or_default()
    }
}

/// Same slim shape plus the calendar date, for month-range reads.
#[derive(Debug, Clone, FromRow)]
pub struct DatedReservationRow {
    pub id: String,
    pub date: String, // YYYY-MM-DD
    pub time_slot_id: i64,
    pub selected_seats: String,
    pub status: String,
    pub tour_type: String,
}

impl DatedReservationRow {
    pub fn slim(&self) -> ReservationRow {
        ReservationRow {
            id: self.id.clone(),
            selected_seats: self.selected_seats.clone(),
            status: self.status.clone(),
            tour_type: self.tour_type.clone(),
        }
    }
}

/// Full reservation row, used by the admin surface.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: String,
    pub reservation_number: String,
    pub boat_id: String,
    pub date: String,
    pub time_slot_id: i64,
    pub status: String,
    pub tour_type: String,
    pub guest_count: i64,
    pub selected_seats: String,
    pub user_name: String,
    pub user_surname: String,
    pub user_phone: String,
    pub user_email: Option<String>,
    pub total_price: f64,
    pub payment_status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Reservation {
    pub fn seats(&self) -> Vec<i64> {
        serde_json::from_str(&self.selected_seats).unwrap_or_default()
    }
}

// --- API payloads ---

#[derive(Debug, Deserialize)]
pub struct StatusUpdatePayload {
    pub status: String,
}

/// Partial admin edit; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct ReservationEditPayload {
    pub selected_seats: Option<Vec<i64>>,
    pub user_phone: Option<String>,
    pub guest_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BulkApprovePayload {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationFilter {
    pub boat_id: Option<String>,
    pub date: Option<String>,
    pub status: Option<String>,
}
