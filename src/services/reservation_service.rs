// src/services/reservation_service.rs
//
// Admin-side operations over reservation rows. Bulk operations issue one
// independent write per record, so a partial failure leaves the rest
// untouched and the caller gets an aggregate count.
use chrono::Local;
use sqlx::SqlitePool;

use crate::error::{AppError, AppResult};
use crate::models::boat::occupied_seats;
use crate::models::reservation::{
    Reservation, ReservationEditPayload, ReservationFilter, ReservationRow, ALL_STATUSES,
    STATUS_CONFIRMED, STATUS_PENDING,
};

fn now_stamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub async fn list_reservations(
    pool: &SqlitePool,
    filter: &ReservationFilter,
) -> AppResult<Vec<Reservation>> {
    let rows = sqlx::query_as::<_, Reservation>(
        r#"
        SELECT * FROM reservations
        WHERE (?1 IS NULL OR boat_id = ?1)
          AND (?2 IS NULL OR date = ?2)
          AND (?3 IS NULL OR status = ?3)
        ORDER BY date DESC, created_at DESC
        "#,
    )
    .bind(&filter.boat_id)
    .bind(&filter.date)
    .bind(&filter.status)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_reservation(pool: &SqlitePool, id: &str) -> AppResult<Reservation> {
    sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::ConfigurationAbsent(format!("Reservation '{}' not found.", id)))
}

pub async fn update_status(pool: &SqlitePool, id: &str, status: &str) -> AppResult {
    if !ALL_STATUSES.contains(&status) {
        return Err(AppError::Validation(format!("Unknown status '{}'.", status)));
    }
    let res = sqlx::query("UPDATE reservations SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_stamp())
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::ConfigurationAbsent(format!(
            "Reservation '{}' not found.",
            id
        )));
    }
    tracing::info!("reservation {} moved to status {}", id, status);
    Ok(())
}

/// Partial edit of seats, phone or headcount. Seat edits are validated
/// against the other active rows of the same boat/date/slot so an admin fix
/// cannot introduce a double-booking.
pub async fn edit_reservation(
    pool: &SqlitePool,
    id: &str,
    payload: &ReservationEditPayload,
) -> AppResult {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::ConfigurationAbsent(format!("Reservation '{}' not found.", id)))?;

    let seats_json = match &payload.selected_seats {
        Some(seats) => {
            let mut sorted = seats.clone();
            sorted.sort_unstable();
            sorted.dedup();
            if sorted.len() != seats.len() {
                return Err(AppError::Validation("Duplicate seats.".into()));
            }
            let others = sqlx::query_as::<_, ReservationRow>(
                r#"
                SELECT id, selected_seats, status, tour_type
                FROM reservations
                WHERE boat_id = ? AND date = ? AND time_slot_id = ? AND id != ?
                  AND status IN ('pending', 'confirmed')
                "#,
            )
            .bind(&existing.boat_id)
            .bind(&existing.date)
            .bind(existing.time_slot_id)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
            let held = occupied_seats(&others);
            if sorted.iter().any(|s| held.contains(s)) {
                return Err(AppError::CapacityConflict(
                    "A requested seat is held by another reservation.".into(),
                ));
            }
            Some(serde_json::to_string(&sorted).map_err(|e| AppError::Validation(e.to_string()))?)
        }
        None => None,
    };

    sqlx::query(
        r#"
        UPDATE reservations SET
            selected_seats = COALESCE(?, selected_seats),
            user_phone = COALESCE(?, user_phone),
            guest_count = COALESCE(?, guest_count),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(seats_json)
    .bind(&payload.user_phone)
    .bind(payload.guest_count)
    .bind(now_stamp())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Hard delete, irreversible; no tombstone is kept.
pub async fn delete_reservation(pool: &SqlitePool, id: &str) -> AppResult {
    let res = sqlx::query("DELETE FROM reservations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::ConfigurationAbsent(format!(
            "Reservation '{}' not found.",
            id
        )));
    }
    tracing::info!("reservation {} deleted", id);
    Ok(())
}

/// Confirms every pending reservation in the list, one write each. No
/// cross-record atomicity: the result reports how many went through.
pub async fn bulk_approve(pool: &SqlitePool, ids: &[String]) -> AppResult<String> {
    let mut ok = 0usize;
    for id in ids {
        let res = sqlx::query(
            "UPDATE reservations SET status = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(STATUS_CONFIRMED)
        .bind(now_stamp())
        .bind(id)
        .bind(STATUS_PENDING)
        .execute(pool)
        .await;
        match res {
            Ok(r) if r.rows_affected() > 0 => ok += 1,
            Ok(_) => {}
            Err(e) => tracing::warn!("bulk approve failed for {}: {:?}", id, e),
        }
    }
    Ok(format!("{} of {} reservations confirmed.", ok, ids.len()))
}
