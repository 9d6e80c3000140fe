// src/services/availability.rs
//
// Occupancy is never stored. Every read recomputes fullness from the current
// reservation rows, so the store stays the single source of truth and a
// stale page can at worst show a seat as free that the submit recheck will
// then reject.
use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::models::boat::occupied_seats;
use crate::models::reservation::{DatedReservationRow, ReservationRow};

pub const DATE_FMT: &str = "%Y-%m-%d";

/// Fraction of the boat taken for one slot, clamped to [0,1].
///
/// Any active exclusive reservation counts as the whole boat, even if its
/// row did not register every seat.
pub fn fullness_for_slot(rows: &[ReservationRow], capacity: i64) -> f64 {
    let active: Vec<&ReservationRow> = rows.iter().filter(|r| r.is_active()).collect();
    if active.is_empty() {
        return 0.0;
    }
    if active.iter().any(|r| r.is_exclusive()) {
        return 1.0;
    }
    if capacity <= 0 {
        return 1.0;
    }
    let taken: usize = active.iter().map(|r| r.seats().len()).sum();
    (taken as f64 / capacity as f64).min(1.0)
}

/// Per-slot fullness for a single day, keyed by slot id. Slots with no
/// reservations are present with fullness 0. Zero configured slots yields
/// an empty map; the caller renders the "no slots" state.
pub fn fullness_for_all_slots(
    rows: &[DatedReservationRow],
    slot_count: usize,
    capacity: i64,
) -> BTreeMap<i64, f64> {
    let mut out = BTreeMap::new();
    for slot_id in 0..slot_count as i64 {
        let slot_rows: Vec<ReservationRow> = rows
            .iter()
            .filter(|r| r.time_slot_id == slot_id)
            .map(|r| r.slim())
            .collect();
        out.insert(slot_id, fullness_for_slot(&slot_rows, capacity));
    }
    out
}

/// Tri-state day signal for the calendar: 0 empty, 0.5 partial, 1 full.
/// "Full" requires every slot on the day to be individually full.
pub fn day_signal(slot_fullness: &BTreeMap<i64, f64>) -> f64 {
    if slot_fullness.is_empty() {
        return 0.0;
    }
    if slot_fullness.values().all(|f| *f >= 1.0) {
        1.0
    } else if slot_fullness.values().all(|f| *f == 0.0) {
        0.0
    } else {
        0.5
    }
}

/// One aggregate signal per calendar day of the given month. Days without
/// reservations come out as 0. Zero configured slots yields an empty map.
pub fn fullness_for_month(
    year: i32,
    month: u32,
    rows: &[DatedReservationRow],
    slot_count: usize,
    capacity: i64,
) -> BTreeMap<String, f64> {
    let mut out = BTreeMap::new();
    if slot_count == 0 {
        return out;
    }

    let mut by_date: BTreeMap<&str, Vec<&DatedReservationRow>> = BTreeMap::new();
    for row in rows {
        by_date.entry(row.date.as_str()).or_default().push(row);
    }

    let mut day = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(d) => d,
        None => return out,
    };
    while day.month() == month {
        let key = day.format(DATE_FMT).to_string();
        let signal = match by_date.get(key.as_str()) {
            Some(day_rows) => {
                let owned: Vec<DatedReservationRow> =
                    day_rows.iter().map(|r| (*r).clone()).collect();
                day_signal(&fullness_for_all_slots(&owned, slot_count, capacity))
            }
            None => 0.0,
        };
        out.insert(key, signal);
        day = match day.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    out
}

// --- Store reads ---
//
// Dates cross this boundary as local-calendar YYYY-MM-DD strings and are
// compared as strings in SQL. No UTC conversion happens anywhere near them.

pub async fn active_for_slot(
    pool: &SqlitePool,
    boat_id: &str,
    date: &str,
    slot_id: i64,
) -> AppResult<Vec<ReservationRow>> {
    let rows = sqlx::query_as::<_, ReservationRow>(
        r#"
        SELECT id, selected_seats, status, tour_type
        FROM reservations
        WHERE boat_id = ? AND date = ? AND time_slot_id = ?
          AND status IN ('pending', 'confirmed')
        "#,
    )
    .bind(boat_id)
    .bind(date)
    .bind(slot_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn active_for_date(
    pool: &SqlitePool,
    boat_id: &str,
    date: &str,
) -> AppResult<Vec<DatedReservationRow>> {
    let rows = sqlx::query_as::<_, DatedReservationRow>(
        r#"
        SELECT id, date, time_slot_id, selected_seats, status, tour_type
        FROM reservations
        WHERE boat_id = ? AND date = ?
          AND status IN ('pending', 'confirmed')
        "#,
    )
    .bind(boat_id)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn active_for_range(
    pool: &SqlitePool,
    boat_id: &str,
    from: &str,
    to: &str,
) -> AppResult<Vec<DatedReservationRow>> {
    let rows = sqlx::query_as::<_, DatedReservationRow>(
        r#"
        SELECT id, date, time_slot_id, selected_seats, status, tour_type
        FROM reservations
        WHERE boat_id = ? AND date BETWEEN ? AND ?
          AND status IN ('pending', 'confirmed')
        ORDER BY date ASC
        "#,
    )
    .bind(boat_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Seats currently held for one slot. Convenience over the slim rows.
pub async fn occupied_for_slot(
    pool: &SqlitePool,
    boat_id: &str,
    date: &str,
    slot_id: i64,
) -> AppResult<std::collections::BTreeSet<i64>> {
    let rows = active_for_slot(pool, boat_id, date, slot_id).await?;
    Ok(occupied_seats(&rows))
}
