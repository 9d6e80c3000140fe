// src/services/policy.rs
//
// Selection rules for the booking flow. The two thresholds here were tuned
// in production rather than written down as business rules, so they stay
// configurable instead of hardcoded.
use chrono::NaiveDate;

use crate::models::boat::Boat;
use crate::models::reservation::DatedReservationRow;
use crate::models::tour::{CustomTour, TourType};
use crate::services::availability::{fullness_for_all_slots, DATE_FMT};

#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// A normal booking is blocked from a slot once its fullness reaches
    /// this cutoff, slightly before mathematical capacity.
    pub near_full_cutoff: f64,
    /// Slots starting in [from, to) hours are treated as crossing midnight
    /// and need an explicit confirmation.
    pub overnight_from_hour: u32,
    pub overnight_to_hour: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            near_full_cutoff: 0.9,
            overnight_from_hour: 1,
            overnight_to_hour: 7,
        }
    }
}

impl PolicyConfig {
    pub fn from_env() -> Self {
        let base = Self::default();
        let parse_f64 = |key: &str, fallback: f64| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        };
        let parse_u32 = |key: &str, fallback: u32| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        };
        Self {
            near_full_cutoff: parse_f64("BOOKING_NEAR_FULL_CUTOFF", base.near_full_cutoff),
            overnight_from_hour: parse_u32("BOOKING_OVERNIGHT_FROM_HOUR", base.overnight_from_hour),
            overnight_to_hour: parse_u32("BOOKING_OVERNIGHT_TO_HOUR", base.overnight_to_hour),
        }
    }
}

/// Seats an exclusive tour must occupy: the custom tour's configured
/// capacity, or the whole boat. Normal tours size themselves from the
/// user's party (adults + children; babies ride on laps), so None here.
pub fn forced_party_size(
    tour: &TourType,
    custom: Option<&CustomTour>,
    boat_capacity: i64,
) -> Option<i64> {
    match tour {
        TourType::Normal => None,
        TourType::Custom(_) => Some(
            custom
                .map(|c| c.capacity.min(boat_capacity))
                .unwrap_or(boat_capacity),
        ),
        _ => Some(boat_capacity),
    }
}

/// Whether a calendar day is selectable for the given tour type.
///
/// Past dates and dates outside the boat's operating range are never
/// selectable. Exclusive tours additionally need the whole day empty
/// across all slots, which is stricter than any per-slot check. Normal
/// tours only need one slot that is not already full.
pub fn can_select_date(
    date: NaiveDate,
    today: NaiveDate,
    boat: &Boat,
    tour: &TourType,
    day_rows: &[DatedReservationRow],
) -> bool {
    if date < today {
        return false;
    }
    let in_range = match (
        NaiveDate::parse_from_str(&boat.start_date, DATE_FMT),
        NaiveDate::parse_from_str(&boat.end_date, DATE_FMT),
    ) {
        (Ok(start), Ok(end)) => date >= start && date <= end,
        _ => false,
    };
    if !in_range {
        return false;
    }

    if tour.is_exclusive() {
        return !day_rows.iter().any(|r| r.slim().is_active());
    }

    let slot_count = boat.slots().len();
    if slot_count == 0 {
        return false;
    }
    let per_slot = fullness_for_all_slots(day_rows, slot_count, boat.capacity);
    per_slot.values().any(|f| *f < 1.0)
}

/// Whether a time slot is selectable given its current fullness. Exclusive
/// tours need the slot completely empty; normal tours are cut off at the
/// configured near-full threshold.
pub fn can_select_slot(cfg: &PolicyConfig, tour: &TourType, fullness: f64) -> bool {
    if tour.is_exclusive() {
        fullness == 0.0
    } else {
        fullness < cfg.near_full_cutoff
    }
}

/// True when finalizing this slot needs the "tour crosses midnight"
/// confirmation: either the window wraps (end before start) or the tour
/// starts in the configured early-morning band.
pub fn requires_overnight_confirmation(cfg: &PolicyConfig, start: &str, end: &str) -> bool {
    if end < start {
        return true;
    }
    match start_hour(start) {
        Some(h) => h >= cfg.overnight_from_hour && h < cfg.overnight_to_hour,
        None => false,
    }
}

/// Slots flagged by the operator need a bait acknowledgement before the
/// selection is finalized. Confirmed before the overnight gate; the two are
/// independent.
pub fn requires_bait_confirmation(slot: &crate::models::boat::TimeSlot) -> bool {
    slot.bait_warning
}

fn start_hour(start: &str) -> Option<u32> {
    start.split(':').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reservation::DatedReservationRow;

    fn boat() -> Boat {
        Boat {
            id: "b1".into(),
            name: "Kılıç".into(),
            code: "KLC".into(),
            capacity: 12,
            seat_layout: "single".into(),
            time_slots: r#"[
                {"start":"07:00","end":"13:00","display_name":"Sabah"},
                {"start":"14:00","end":"20:00","display_name":"Akşam"}
            ]"#
            .into(),
            seat_price: 500.0,
            charter_price: 6000.0,
            start_date: "2026-05-01".into(),
            end_date: "2026-10-31".into(),
        }
    }

    fn dated(slot: i64, tour: &str, seats: &[i64]) -> DatedReservationRow {
        DatedReservationRow {
            id: "r".into(),
            date: "2026-07-10".into(),
            time_slot_id: slot,
            selected_seats: serde_json::to_string(seats).unwrap(),
            status: "pending".into(),
            tour_type: tour.into(),
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    #[test]
    fn exclusive_tours_force_full_capacity() {
        assert_eq!(forced_party_size(&TourType::Normal, None, 12), None);
        assert_eq!(forced_party_size(&TourType::Private, None, 12), Some(12));
        let tour = CustomTour {
            id: "sunset".into(),
            name: "Sunset".into(),
            price: 4000.0,
            capacity: 8,
            is_active: true,
        };
        assert_eq!(
            forced_party_size(&TourType::Custom("sunset".into()), Some(&tour), 12),
            Some(8)
        );
    }

    #[test]
    fn past_and_out_of_season_dates_rejected() {
        let today = d("2026-07-10");
        assert!(!can_select_date(d("2026-07-09"), today, &boat(), &TourType::Normal, &[]));
        assert!(!can_select_date(d("2026-11-01"), today, &boat(), &TourType::Normal, &[]));
        assert!(can_select_date(d("2026-07-10"), today, &boat(), &TourType::Normal, &[]));
    }

    #[test]
    fn exclusive_needs_a_fully_empty_day() {
        let today = d("2026-07-01");
        let rows = vec![dated(0, "normal", &[3])];
        // One seat taken in one slot blocks the whole day for a charter,
        // but normal bookings still go through.
        assert!(!can_select_date(d("2026-07-10"), today, &boat(), &TourType::Private, &rows));
        assert!(can_select_date(d("2026-07-10"), today, &boat(), &TourType::Normal, &rows));
    }

    #[test]
    fn normal_needs_one_open_slot() {
        let today = d("2026-07-01");
        let full: Vec<i64> = (1..=12).collect();
        let rows = vec![dated(0, "normal", &full), dated(1, "private", &[])];
        assert!(!can_select_date(d("2026-07-10"), today, &boat(), &TourType::Normal, &rows));
    }

    #[test]
    fn slot_selection_respects_cutoffs() {
        let cfg = PolicyConfig::default();
        // Scenario B: three seats taken means no private tour here.
        assert!(!can_select_slot(&cfg, &TourType::Private, 0.25));
        assert!(can_select_slot(&cfg, &TourType::Private, 0.0));
        // Scenario C: a private reservation blocks normal bookings.
        assert!(!can_select_slot(&cfg, &TourType::Normal, 1.0));
        // The near-full buffer kicks in before true capacity.
        assert!(can_select_slot(&cfg, &TourType::Normal, 0.85));
        assert!(!can_select_slot(&cfg, &TourType::Normal, 0.9));
    }

    #[test]
    fn overnight_detection() {
        let cfg = PolicyConfig::default();
        assert!(requires_overnight_confirmation(&cfg, "19:00", "01:00"));
        assert!(requires_overnight_confirmation(&cfg, "02:00", "08:00"));
        assert!(!requires_overnight_confirmation(&cfg, "09:00", "13:00"));
        assert!(!requires_overnight_confirmation(&cfg, "07:00", "13:00"));
    }
}
