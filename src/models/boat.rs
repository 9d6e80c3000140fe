// src/models/boat.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::reservation::ReservationRow;

/// One configured operating window for a boat. Stored inside the boat row as
/// a JSON array; a slot's identity is its index in that array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String, // "HH:MM", 24h
    pub end: String,
    pub display_name: String,
    #[serde(default)]
    pub bait_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatLayout {
    Single,
    Double,
}

impl SeatLayout {
    pub fn parse(s: &str) -> Self {
        match s {
            "double" => SeatLayout::Double,
            _ => SeatLayout::Single,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Boat {
    pub id: String,
    pub name: String,
    pub code: String,
    pub capacity: i64,
    pub seat_layout: String,
    pub time_slots: String, // JSON column, see TimeSlot
    pub seat_price: f64,
    pub charter_price: f64,
    pub start_date: String, // YYYY-MM-DD
    pub end_date: String,
}

impl Boat {
    pub fn slots(&self) -> Vec<TimeSlot> {
        serde_json::from_str(&self.time_slots).unwrap_or_default()
    }

    pub fn slot(&self, slot_id: i64) -> Option<TimeSlot> {
        usize::try_from(slot_id)
            .ok()
            .and_then(|i| self.slots().into_iter().nth(i))
    }

    pub fn layout(&self) -> SeatLayout {
        SeatLayout::parse(&self.seat_layout)
    }
}

/// Which side of the boat a seat sits on. Derived from the seat number and
/// the layout, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatSide {
    Port,      // İskele
    Starboard, // Sancak
}

impl SeatSide {
    pub fn letter(self) -> char {
        match self {
            SeatSide::Port => 'I',
            SeatSide::Starboard => 'S',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SeatSide::Port => "İskele",
            SeatSide::Starboard => "Sancak",
        }
    }
}

/// Side and row position of a seat.
///
/// Single layout: seats 1..=capacity/2 run down the port side, the rest down
/// the starboard side. Double layout: seats are paired (2k-1, 2k) as
/// port/starboard of row k.
pub fn seat_side(seat: i64, capacity: i64, layout: SeatLayout) -> Option<(SeatSide, i64)> {
    if seat < 1 || seat > capacity {
        return None;
    }
    match layout {
        SeatLayout::Single => {
            let half = capacity / 2;
            if seat <= half {
                Some((SeatSide::Port, seat))
            } else {
                Some((SeatSide::Starboard, seat - half))
            }
        }
        SeatLayout::Double => {
            let row = (seat + 1) / 2;
            if seat % 2 == 1 {
                Some((SeatSide::Port, row))
            } else {
                Some((SeatSide::Starboard, row))
            }
        }
    }
}

/// Display code for a seat, e.g. "KLC_I3". Purely presentational; returns
/// None for seat numbers outside the layout so corrupt data renders as a
/// gap instead of crashing a page.
pub fn seat_code(seat: i64, boat_code: &str, capacity: i64, layout: SeatLayout) -> Option<String> {
    seat_side(seat, capacity, layout)
        .map(|(side, pos)| format!("{}_{}{}", boat_code, side.letter(), pos))
}

/// Union of selected seats over all active (pending or confirmed) rows.
/// Out-of-range seat numbers from corrupt rows are kept so occupancy never
/// under-counts; rendering is where they get dropped.
pub fn occupied_seats(reservations: &[ReservationRow]) -> std::collections::BTreeSet<i64> {
    reservations
        .iter()
        .filter(|r| r.is_active())
        .flat_map(|r| r.seats())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::reservation::ReservationRow;

    fn row(status: &str, seats: &[i64]) -> ReservationRow {
        ReservationRow {
            id: "r".into(),
            selected_seats: serde_json::to_string(seats).unwrap(),
            status: status.into(),
            tour_type: "normal".into(),
        }
    }

    #[test]
    fn single_layout_sides() {
        assert_eq!(seat_side(1, 12, SeatLayout::Single), Some((SeatSide::Port, 1)));
        assert_eq!(seat_side(6, 12, SeatLayout::Single), Some((SeatSide::Port, 6)));
        assert_eq!(seat_side(7, 12, SeatLayout::Single), Some((SeatSide::Starboard, 1)));
        assert_eq!(seat_side(12, 12, SeatLayout::Single), Some((SeatSide::Starboard, 6)));
    }

    #[test]
    fn double_layout_pairs_rows() {
        assert_eq!(seat_side(1, 12, SeatLayout::Double), Some((SeatSide::Port, 1)));
        assert_eq!(seat_side(2, 12, SeatLayout::Double), Some((SeatSide::Starboard, 1)));
        assert_eq!(seat_side(11, 12, SeatLayout::Double), Some((SeatSide::Port, 6)));
        assert_eq!(seat_side(12, 12, SeatLayout::Double), Some((SeatSide::Starboard, 6)));
    }

    #[test]
    fn seat_code_is_stable_and_fails_soft() {
        assert_eq!(
            seat_code(8, "KLC", 12, SeatLayout::Single).as_deref(),
            Some("KLC_S2")
        );
        assert_eq!(seat_code(0, "KLC", 12, SeatLayout::Single), None);
        assert_eq!(seat_code(13, "KLC", 12, SeatLayout::Single), None);
    }

    #[test]
    fn occupied_seats_ignores_inactive_rows() {
        let rows = vec![
            row("pending", &[1, 2]),
            row("confirmed", &[5]),
            row("cancelled", &[7, 8]),
            row("completed", &[9]),
        ];
        let occ = occupied_seats(&rows);
        assert_eq!(occ.into_iter().collect::<Vec<_>>(), vec![1, 2, 5]);
    }

    #[test]
    fn occupied_seats_keeps_out_of_range_values() {
        // Corrupt data still counts toward occupancy.
        let rows = vec![row("pending", &[99])];
        assert!(occupied_seats(&rows).contains(&99));
    }
}
