// src/services/boat_service.rs
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::boat::Boat;
use crate::models::tour::CustomTour;

pub async fn list_boats(pool: &SqlitePool) -> AppResult<Vec<Boat>> {
    let boats = sqlx::query_as::<_, Boat>("SELECT * FROM boats ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(boats)
}

pub async fn find_boat(pool: &SqlitePool, boat_id: &str) -> AppResult<Boat> {
    let boat = sqlx::query_as::<_, Boat>("SELECT * FROM boats WHERE id = ?")
        .bind(boat_id)
        .fetch_optional(pool)
        .await?;
    boat.ok_or_else(|| AppError::ConfigurationAbsent(format!("Boat '{}' not found.", boat_id)))
}

/// The tours a customer can pick from. Inactive rows stay in the table for
/// old reservations but are never offered.
pub async fn active_custom_tours(pool: &SqlitePool) -> AppResult<Vec<CustomTour>> {
    let tours = sqlx::query_as::<_, CustomTour>(
        "SELECT * FROM custom_tours WHERE is_active = 1 ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(tours)
}

pub async fn find_active_custom_tour(pool: &SqlitePool, tour_id: &str) -> AppResult<CustomTour> {
    let tour = sqlx::query_as::<_, CustomTour>(
        "SELECT * FROM custom_tours WHERE id = ? AND is_active = 1",
    )
    .bind(tour_id)
    .fetch_optional(pool)
    .await?;
    tour.ok_or_else(|| {
        AppError::ConfigurationAbsent(format!("Tour '{}' is no longer offered.", tour_id))
    })
}
