// src/services/booking.rs
//
// The booking wizard. The in-progress draft lives in the caller's session
// and every transition re-validates against fresh occupancy reads, so a
// stale snapshot can never advance the draft. The final submit repeats the
// whole check inside one transaction before writing.
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::boat::{occupied_seats, Boat};
use crate::models::reservation::{DatedReservationRow, Reservation, ReservationRow};
use crate::models::tour::{CustomTour, TourType};
use crate::services::availability::{self, fullness_for_slot, DATE_FMT};
use crate::services::boat_service;
use crate::services::policy::{self, PolicyConfig};

pub const DRAFT_SESSION_KEY: &str = "booking_draft";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    TourTypeSelection,
    PartySizeSelection,
    DateSelection,
    SlotSelection,
    SeatSelection,
    ContactInfo,
    ReadyToSubmit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactInfo {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Option<String>,
}

/// The serializable in-progress reservation. Earlier fields gate later
/// ones; clearing a field clears everything that depends on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingDraft {
    pub boat_id: String,
    pub tour_type: Option<String>,
    pub adults: i64,
    pub children: i64,
    pub babies: i64,
    /// Seats the party needs. For exclusive tours this is forced to the
    /// tour's capacity; babies never count toward it.
    pub party_size: Option<i64>,
    pub date: Option<String>,
    pub time_slot_id: Option<i64>,
    pub selected_seats: Vec<i64>,
    pub contact: Option<ContactInfo>,
}

/// Outcome of a seat click. An occupied seat is silently ignored, the UI
/// may show a transient note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatToggle {
    Added,
    Removed,
    Ignored,
}

impl BookingDraft {
    pub fn new(boat_id: &str) -> Self {
        Self {
            boat_id: boat_id.to_string(),
            ..Default::default()
        }
    }

    pub fn tour(&self) -> Option<TourType> {
        self.tour_type.as_deref().map(TourType::parse)
    }

    fn is_exclusive(&self) -> bool {
        self.tour().map(|t| t.is_exclusive()).unwrap_or(false)
    }

    /// The step the customer is currently on, derived from what is filled.
    pub fn step(&self) -> BookingStep {
        let tour = match self.tour() {
            Some(t) => t,
            None => return BookingStep::TourTypeSelection,
        };
        if self.party_size.is_none() {
            return if tour.is_exclusive() {
                // Party size is auto-filled on tour selection; reaching
                // here without one means the draft was reset.
                BookingStep::TourTypeSelection
            } else {
                BookingStep::PartySizeSelection
            };
        }
        if self.date.is_none() {
            return BookingStep::DateSelection;
        }
        if self.time_slot_id.is_none() {
            return BookingStep::SlotSelection;
        }
        if !tour.is_exclusive()
            && (self.selected_seats.len() as i64) < self.party_size.unwrap_or(0)
        {
            return BookingStep::SeatSelection;
        }
        if self.contact.is_none() {
            return BookingStep::ContactInfo;
        }
        BookingStep::ReadyToSubmit
    }

    /// Moving backward clears everything captured by later steps, so a
    /// changed date or tour type can never keep stale slots or seats.
    pub fn back_to(&mut self, step: BookingStep) {
        if step <= BookingStep::ContactInfo {
            self.contact = None;
        }
        if step <= BookingStep::SeatSelection {
            self.selected_seats.clear();
        }
        if step <= BookingStep::SlotSelection {
            self.time_slot_id = None;
        }
        if step <= BookingStep::DateSelection {
            self.date = None;
        }
        if step <= BookingStep::PartySizeSelection {
            self.party_size = None;
            self.adults = 0;
            self.children = 0;
            self.babies = 0;
        }
        if step == BookingStep::TourTypeSelection {
            self.tour_type = None;
        }
    }

    /// Tour type chosen (or changed). Everything downstream resets; for
    /// exclusive tours the party size is forced and the manual party and
    /// seat steps are skipped.
    pub fn choose_tour_type(
        &mut self,
        tour: &TourType,
        custom: Option<&CustomTour>,
        boat: &Boat,
    ) {
        self.back_to(BookingStep::TourTypeSelection);
        self.tour_type = Some(tour.as_str().to_string());
        if let Some(forced) = policy::forced_party_size(tour, custom, boat.capacity) {
            self.party_size = Some(forced);
        }
    }

    pub fn choose_party(
        &mut self,
        adults: i64,
        children: i64,
        babies: i64,
        boat: &Boat,
    ) -> AppResult {
        let tour = self
            .tour()
            .ok_or_else(|| AppError::Validation("Choose a tour type first.".into()))?;
        if tour.is_exclusive() {
            return Err(AppError::Validation(
                "Party size is fixed for private and custom tours.".into(),
            ));
        }
        if adults < 1 || children < 0 || babies < 0 {
            return Err(AppError::Validation(
                "At least one adult is required.".into(),
            ));
        }
        let seats_needed = adults + children;
        if seats_needed > boat.capacity {
            return Err(AppError::Validation(format!(
                "This boat seats at most {} guests.",
                boat.capacity
            )));
        }
        self.back_to(BookingStep::PartySizeSelection);
        self.adults = adults;
        self.children = children;
        self.babies = babies;
        self.party_size = Some(seats_needed);
        Ok(())
    }

    pub fn choose_date(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
        boat: &Boat,
        day_rows: &[DatedReservationRow],
    ) -> AppResult {
        let tour = self
            .tour()
            .ok_or_else(|| AppError::Validation("Choose a tour type first.".into()))?;
        if self.party_size.is_none() {
            return Err(AppError::Validation("Choose your party size first.".into()));
        }
        if boat.slots().is_empty() {
            return Err(AppError::ConfigurationAbsent(
                "This boat has no time slots configured.".into(),
            ));
        }
        if !policy::can_select_date(date, today, boat, &tour, day_rows) {
            return Err(AppError::Validation(
                "That date is not available for this tour.".into(),
            ));
        }
        self.back_to(BookingStep::DateSelection);
        self.date = Some(date.format(DATE_FMT).to_string());
        Ok(())
    }

    /// Slot chosen. The bait acknowledgement is checked first, then the
    /// overnight confirmation; both must be present when their gate fires.
    /// Exclusive tours auto-select the full seat range here.
    #[allow(clippy::too_many_arguments)]
    pub fn choose_slot(
        &mut self,
        cfg: &PolicyConfig,
        boat: &Boat,
        slot_id: i64,
        slot_rows: &[ReservationRow],
        bait_acknowledged: bool,
        overnight_confirmed: bool,
    ) -> AppResult {
        let tour = self
            .tour()
            .ok_or_else(|| AppError::Validation("Choose a tour type first.".into()))?;
        if self.date.is_none() {
            return Err(AppError::Validation("Choose a date first.".into()));
        }
        let slot = boat.slot(slot_id).ok_or_else(|| {
            AppError::ConfigurationAbsent("That time slot does not exist.".into())
        })?;

        let fullness = fullness_for_slot(slot_rows, boat.capacity);
        if !policy::can_select_slot(cfg, &tour, fullness) {
            return Err(AppError::Validation(
                "That time slot is no longer available.".into(),
            ));
        }
        if policy::requires_bait_confirmation(&slot) && !bait_acknowledged {
            return Err(AppError::Validation(
                "Please acknowledge the bait notice for this slot.".into(),
            ));
        }
        if policy::requires_overnight_confirmation(cfg, &slot.start, &slot.end)
            && !overnight_confirmed
        {
            return Err(AppError::Validation(
                "This tour crosses midnight; please confirm to continue.".into(),
            ));
        }

        self.back_to(BookingStep::SlotSelection);
        self.time_slot_id = Some(slot_id);
        if tour.is_exclusive() {
            self.selected_seats = (1..=boat.capacity).collect();
        }
        Ok(())
    }

    /// A seat click. Clicking a held seat removes it, a free seat adds it,
    /// and a seat occupied by someone else is ignored.
    pub fn toggle_seat(
        &mut self,
        seat: i64,
        boat: &Boat,
        occupied: &std::collections::BTreeSet<i64>,
    ) -> AppResult<SeatToggle> {
        if self.is_exclusive() {
            return Err(AppError::Validation(
                "Seats are assigned automatically for private and custom tours.".into(),
            ));
        }
        if self.time_slot_id.is_none() {
            return Err(AppError::Validation("Choose a time slot first.".into()));
        }
        if seat < 1 || seat > boat.capacity {
            return Err(AppError::Validation("No such seat.".into()));
        }
        if let Some(pos) = self.selected_seats.iter().position(|s| *s == seat) {
            self.selected_seats.remove(pos);
            self.contact = None;
            return Ok(SeatToggle::Removed);
        }
        if occupied.contains(&seat) {
            return Ok(SeatToggle::Ignored);
        }
        let needed = self.party_size.unwrap_or(0);
        if self.selected_seats.len() as i64 >= needed {
            return Err(AppError::Validation(format!(
                "You have already selected {} seats for your party.",
                needed
            )));
        }
        self.selected_seats.push(seat);
        Ok(SeatToggle::Added)
    }

    pub fn set_contact(
        &mut self,
        name: &str,
        surname: &str,
        phone: &str,
        email: Option<String>,
    ) -> AppResult {
        if !self.is_exclusive() {
            let needed = self.party_size.unwrap_or(0);
            if (self.selected_seats.len() as i64) != needed {
                return Err(AppError::Validation(format!(
                    "Select {} seats before entering contact details.",
                    needed
                )));
            }
        }
        if name.trim().is_empty() || surname.trim().is_empty() || phone.trim().is_empty() {
            return Err(AppError::Validation(
                "Name, surname and phone are required.".into(),
            ));
        }
        self.contact = Some(ContactInfo {
            name: name.trim().to_string(),
            surname: surname.trim().to_string(),
            phone: phone.trim().to_string(),
            email: email.filter(|e| !e.trim().is_empty()),
        });
        Ok(())
    }
}

// --- Async transitions: fetch fresh data, then apply the pure guard ---

pub async fn select_tour_type(
    pool: &SqlitePool,
    draft: &mut BookingDraft,
    tour_type: &str,
) -> AppResult {
    let boat = boat_service::find_boat(pool, &draft.boat_id).await?;
    let tour = TourType::parse(tour_type);
    let custom = match &tour {
        TourType::Custom(id) => Some(boat_service::find_active_custom_tour(pool, id).await?),
        _ => None,
    };
    draft.choose_tour_type(&tour, custom.as_ref(), &boat);
    Ok(())
}

pub async fn select_party(
    pool: &SqlitePool,
    draft: &mut BookingDraft,
    adults: i64,
    children: i64,
    babies: i64,
) -> AppResult {
    let boat = boat_service::find_boat(pool, &draft.boat_id).await?;
    draft.choose_party(adults, children, babies, &boat)
}

pub async fn select_date(pool: &SqlitePool, draft: &mut BookingDraft, date: &str) -> AppResult {
    let boat = boat_service::find_boat(pool, &draft.boat_id).await?;
    let date = NaiveDate::parse_from_str(date, DATE_FMT)
        .map_err(|_| AppError::Validation("Invalid date.".into()))?;
    let day_rows = availability::active_for_date(pool, &boat.id, &date.format(DATE_FMT).to_string()).await?;
    let today = Local::now().date_naive();
    draft.choose_date(date, today, &boat, &day_rows)
}

pub async fn select_slot(
    pool: &SqlitePool,
    cfg: &PolicyConfig,
    draft: &mut BookingDraft,
    slot_id: i64,
    bait_acknowledged: bool,
    overnight_confirmed: bool,
) -> AppResult {
    let boat = boat_service::find_boat(pool, &draft.boat_id).await?;
    let date = draft
        .date
        .clone()
        .ok_or_else(|| AppError::Validation("Choose a date first.".into()))?;
    let slot_rows = availability::active_for_slot(pool, &boat.id, &date, slot_id).await?;
    draft.choose_slot(cfg, &boat, slot_id, &slot_rows, bait_acknowledged, overnight_confirmed)
}

pub async fn toggle_seat(
    pool: &SqlitePool,
    draft: &mut BookingDraft,
    seat: i64,
) -> AppResult<SeatToggle> {
    let boat = boat_service::find_boat(pool, &draft.boat_id).await?;
    let (date, slot_id) = match (&draft.date, draft.time_slot_id) {
        (Some(d), Some(s)) => (d.clone(), s),
        _ => return Err(AppError::Validation("Choose a time slot first.".into())),
    };
    let occupied = availability::occupied_for_slot(pool, &boat.id, &date, slot_id).await?;
    draft.toggle_seat(seat, &boat, &occupied)
}

// --- Write path ---

fn reservation_number(date: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("TKN-{}-{}", date.replace('-', ""), suffix)
}

/// The authoritative check-then-write. Re-fetches occupancy inside one
/// transaction with the insert, so on this store two submits for the same
/// seats cannot both pass the recheck.
pub async fn submit(pool: &SqlitePool, draft: &BookingDraft) -> AppResult<Reservation> {
    let tour = draft
        .tour()
        .ok_or_else(|| AppError::Validation("Choose a tour type first.".into()))?;
    let (date, slot_id) = match (&draft.date, draft.time_slot_id) {
        (Some(d), Some(s)) => (d.clone(), s),
        _ => return Err(AppError::Validation("The booking is not complete.".into())),
    };
    let contact = draft
        .contact
        .clone()
        .ok_or_else(|| AppError::Validation("Contact details are required.".into()))?;
    let party_size = draft
        .party_size
        .ok_or_else(|| AppError::Validation("Party size is missing.".into()))?;

    let boat = boat_service::find_boat(pool, &draft.boat_id).await?;
    if boat.slot(slot_id).is_none() {
        return Err(AppError::ConfigurationAbsent(
            "That time slot does not exist.".into(),
        ));
    }

    let total_price = match &tour {
        TourType::Normal => {
            if draft.selected_seats.len() as i64 != party_size {
                return Err(AppError::Validation(
                    "Seat selection does not match the party size.".into(),
                ));
            }
            boat.seat_price * party_size as f64
        }
        TourType::Custom(id) => boat_service::find_active_custom_tour(pool, id).await?.price,
        _ => boat.charter_price,
    };

    let seats: Vec<i64> = if tour.is_exclusive() {
        (1..=boat.capacity).collect()
    } else {
        let mut s = draft.selected_seats.clone();
        s.sort_unstable();
        s.dedup();
        if s.len() != draft.selected_seats.len() {
            return Err(AppError::Validation("Duplicate seats in selection.".into()));
        }
        if s.iter().any(|seat| *seat < 1 || *seat > boat.capacity) {
            return Err(AppError::Validation("Seat out of range.".into()));
        }
        s
    };

    let mut tx = pool.begin().await?;

    // Recheck against the freshest rows, not the snapshot the customer
    // clicked through. Exclusive tours need the whole day empty.
    if tour.is_exclusive() {
        let day_count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM reservations
            WHERE boat_id = ? AND date = ?
              AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(&boat.id)
        .bind(&date)
        .fetch_one(&mut *tx)
        .await?;
        if day_count > 0 {
            return Err(AppError::CapacityConflict(
                "The boat was booked for that day while you were choosing.".into(),
            ));
        }
    } else {
        let slot_rows = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT id, selected_seats, status, tour_type
            FROM reservations
            WHERE boat_id = ? AND date = ? AND time_slot_id = ?
              AND status IN ('pending', 'confirmed')
            "#,
        )
        .bind(&boat.id)
        .bind(&date)
        .bind(slot_id)
        .fetch_all(&mut *tx)
        .await?;

        if slot_rows.iter().any(|r| r.is_exclusive()) {
            return Err(AppError::CapacityConflict(
                "The slot was taken by a private tour while you were choosing.".into(),
            ));
        }
        let occupied = occupied_seats(&slot_rows);
        if seats.iter().any(|s| occupied.contains(s)) {
            return Err(AppError::CapacityConflict(
                "One of your seats was just booked by someone else.".into(),
            ));
        }
        if (occupied.len() + seats.len()) as i64 > boat.capacity {
            return Err(AppError::CapacityConflict(
                "The slot no longer has room for your party.".into(),
            ));
        }
    }

    let reservation = Reservation {
        id: Uuid::new_v4().to_string(),
        reservation_number: reservation_number(&date),
        boat_id: boat.id.clone(),
        date: date.clone(),
        time_slot_id: slot_id,
        status: "pending".into(),
        tour_type: tour.as_str().to_string(),
        guest_count: party_size,
        selected_seats: serde_json::to_string(&seats)
            .map_err(|e| AppError::Validation(e.to_string()))?,
        user_name: contact.name,
        user_surname: contact.surname,
        user_phone: contact.phone,
        user_email: contact.email,
        total_price,
        payment_status: "waiting".into(),
        created_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        updated_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO reservations (
            id, reservation_number, boat_id, date, time_slot_id, status,
            tour_type, guest_count, selected_seats, user_name, user_surname,
            user_phone, user_email, total_price, payment_status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&reservation.id)
    .bind(&reservation.reservation_number)
    .bind(&reservation.boat_id)
    .bind(&reservation.date)
    .bind(reservation.time_slot_id)
    .bind(&reservation.status)
    .bind(&reservation.tour_type)
    .bind(reservation.guest_count)
    .bind(&reservation.selected_seats)
    .bind(&reservation.user_name)
    .bind(&reservation.user_surname)
    .bind(&reservation.user_phone)
    .bind(&reservation.user_email)
    .bind(reservation.total_price)
    .bind(&reservation.payment_status)
    .bind(&reservation.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(
        "reservation {} created for boat {} on {} slot {}",
        reservation.reservation_number,
        reservation.boat_id,
        reservation.date,
        reservation.time_slot_id
    );
    Ok(reservation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn boat() -> Boat {
        Boat {
            id: "b1".into(),
            name: "Kılıç".into(),
            code: "KLC".into(),
            capacity: 12,
            seat_layout: "single".into(),
            time_slots: r#"[
                {"start":"07:00","end":"13:00","display_name":"Sabah"},
                {"start":"19:00","end":"01:00","display_name":"Gece","bait_warning":true}
            ]"#
            .into(),
            seat_price: 500.0,
            charter_price: 6000.0,
            start_date: "2026-05-01".into(),
            end_date: "2026-10-31".into(),
        }
    }

    fn normal_draft_at_seat_selection() -> BookingDraft {
        let mut d = BookingDraft::new("b1");
        d.choose_tour_type(&TourType::Normal, None, &boat());
        d.choose_party(2, 1, 0, &boat()).unwrap();
        d.date = Some("2026-07-10".into());
        d.time_slot_id = Some(0);
        d
    }

    #[test]
    fn steps_advance_in_order() {
        let mut d = BookingDraft::new("b1");
        assert_eq!(d.step(), BookingStep::TourTypeSelection);
        d.choose_tour_type(&TourType::Normal, None, &boat());
        assert_eq!(d.step(), BookingStep::PartySizeSelection);
        d.choose_party(2, 0, 1, &boat()).unwrap();
        assert_eq!(d.step(), BookingStep::DateSelection);
        d.date = Some("2026-07-10".into());
        assert_eq!(d.step(), BookingStep::SlotSelection);
        d.time_slot_id = Some(0);
        assert_eq!(d.step(), BookingStep::SeatSelection);
        d.toggle_seat(1, &boat(), &BTreeSet::new()).unwrap();
        d.toggle_seat(2, &boat(), &BTreeSet::new()).unwrap();
        assert_eq!(d.step(), BookingStep::ContactInfo);
        d.set_contact("Ayşe", "Yılmaz", "+90 555 000 0000", None).unwrap();
        assert_eq!(d.step(), BookingStep::ReadyToSubmit);
    }

    #[test]
    fn exclusive_tours_skip_party_and_seats() {
        let mut d = BookingDraft::new("b1");
        d.choose_tour_type(&TourType::Private, None, &boat());
        assert_eq!(d.party_size, Some(12));
        assert_eq!(d.step(), BookingStep::DateSelection);
        assert!(d.choose_party(2, 0, 0, &boat()).is_err());

        d.date = Some("2026-07-10".into());
        let cfg = PolicyConfig::default();
        d.choose_slot(&cfg, &boat(), 0, &[], false, false).unwrap();
        assert_eq!(d.selected_seats, (1..=12).collect::<Vec<_>>());
        assert_eq!(d.step(), BookingStep::ContactInfo);
    }

    #[test]
    fn occupied_seat_click_is_a_no_op() {
        let mut d = normal_draft_at_seat_selection();
        let occupied: BTreeSet<i64> = [5].into_iter().collect();
        assert_eq!(d.toggle_seat(5, &boat(), &occupied).unwrap(), SeatToggle::Ignored);
        assert!(d.selected_seats.is_empty());
        assert_eq!(d.toggle_seat(6, &boat(), &occupied).unwrap(), SeatToggle::Added);
        assert_eq!(d.toggle_seat(6, &boat(), &occupied).unwrap(), SeatToggle::Removed);
    }

    #[test]
    fn cannot_select_more_seats_than_party() {
        let mut d = normal_draft_at_seat_selection();
        let free = BTreeSet::new();
        for seat in 1..=3 {
            d.toggle_seat(seat, &boat(), &free).unwrap();
        }
        assert!(d.toggle_seat(4, &boat(), &free).is_err());
    }

    #[test]
    fn contact_requires_complete_seat_selection() {
        let mut d = normal_draft_at_seat_selection();
        assert!(d.set_contact("Ayşe", "Yılmaz", "+90", None).is_err());
        let free = BTreeSet::new();
        for seat in 1..=3 {
            d.toggle_seat(seat, &boat(), &free).unwrap();
        }
        assert!(d.set_contact("", "Yılmaz", "+90", None).is_err());
        assert!(d.set_contact("Ayşe", "Yılmaz", "+90", Some("  ".into())).is_ok());
        assert_eq!(d.contact.as_ref().unwrap().email, None);
    }

    #[test]
    fn backtracking_clears_later_steps() {
        let mut d = normal_draft_at_seat_selection();
        let free = BTreeSet::new();
        for seat in 1..=3 {
            d.toggle_seat(seat, &boat(), &free).unwrap();
        }
        d.set_contact("Ayşe", "Yılmaz", "+90", None).unwrap();

        d.back_to(BookingStep::DateSelection);
        assert_eq!(d.date, None);
        assert_eq!(d.time_slot_id, None);
        assert!(d.selected_seats.is_empty());
        assert!(d.contact.is_none());
        // Party size survives a date change.
        assert_eq!(d.party_size, Some(3));
    }

    #[test]
    fn slot_gates_fire_in_order() {
        let cfg = PolicyConfig::default();
        let mut d = normal_draft_at_seat_selection();
        d.time_slot_id = None;
        // Slot 1 has both the bait flag and an overnight window.
        let err = d.choose_slot(&cfg, &boat(), 1, &[], false, true).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("bait")));
        let err = d.choose_slot(&cfg, &boat(), 1, &[], true, false).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("midnight")));
        assert!(d.choose_slot(&cfg, &boat(), 1, &[], true, true).is_ok());
    }

    #[test]
    fn changing_tour_type_resets_everything_downstream() {
        let mut d = normal_draft_at_seat_selection();
        d.choose_tour_type(&TourType::Private, None, &boat());
        assert_eq!(d.date, None);
        assert_eq!(d.time_slot_id, None);
        assert!(d.selected_seats.is_empty());
        assert_eq!(d.party_size, Some(12));
    }

    // --- Write-path tests against an in-memory store ---

    async fn test_pool() -> SqlitePool {
        // A single connection so the whole pool shares one :memory: db.
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        sqlx::query(
            r#"
            INSERT INTO boats (id, name, code, capacity, seat_layout, time_slots,
                               seat_price, charter_price, start_date, end_date)
            VALUES ('b1', 'Kılıç', 'KLC', 12, 'single',
                    '[{"start":"07:00","end":"13:00","display_name":"Sabah"},
                      {"start":"14:00","end":"20:00","display_name":"Akşam"}]',
                    500, 6000, '2026-05-01', '2099-10-31')
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    fn submittable_draft(tour: TourType, seats: &[i64]) -> BookingDraft {
        BookingDraft {
            boat_id: "b1".into(),
            tour_type: Some(tour.as_str().to_string()),
            adults: seats.len() as i64,
            children: 0,
            babies: 0,
            party_size: Some(if tour.is_exclusive() { 12 } else { seats.len() as i64 }),
            date: Some("2030-07-10".into()),
            time_slot_id: Some(0),
            selected_seats: seats.to_vec(),
            contact: Some(ContactInfo {
                name: "Ayşe".into(),
                surname: "Yılmaz".into(),
                phone: "+90 555 000 0000".into(),
                email: None,
            }),
        }
    }

    #[tokio::test]
    async fn normal_submit_yields_quarter_fullness() {
        let pool = test_pool().await;
        let draft = submittable_draft(TourType::Normal, &[1, 2, 3]);
        let res = submit(&pool, &draft).await.unwrap();
        assert_eq!(res.status, "pending");
        assert_eq!(res.payment_status, "waiting");
        assert_eq!(res.total_price, 1500.0);
        assert!(res.reservation_number.starts_with("TKN-20300710-"));

        let rows = availability::active_for_slot(&pool, "b1", "2030-07-10", 0)
            .await
            .unwrap();
        assert_eq!(fullness_for_slot(&rows, 12), 0.25);
    }

    #[tokio::test]
    async fn private_submit_fills_the_slot_and_blocks_normals() {
        let pool = test_pool().await;
        let draft = submittable_draft(TourType::Private, &[]);
        let res = submit(&pool, &draft).await.unwrap();
        assert_eq!(res.seats(), (1..=12).collect::<Vec<_>>());
        assert_eq!(res.total_price, 6000.0);

        let rows = availability::active_for_slot(&pool, "b1", "2030-07-10", 0)
            .await
            .unwrap();
        assert_eq!(fullness_for_slot(&rows, 12), 1.0);
        assert!(!policy::can_select_slot(
            &PolicyConfig::default(),
            &TourType::Normal,
            1.0
        ));
    }

    #[tokio::test]
    async fn private_submit_rejected_when_day_is_not_empty() {
        let pool = test_pool().await;
        // An existing normal booking in the other slot of the day.
        let mut existing = submittable_draft(TourType::Normal, &[4]);
        existing.time_slot_id = Some(1);
        submit(&pool, &existing).await.unwrap();

        let err = submit(&pool, &submittable_draft(TourType::Private, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityConflict(_)));
    }

    #[tokio::test]
    async fn submit_rejects_seats_taken_in_the_meantime() {
        let pool = test_pool().await;
        submit(&pool, &submittable_draft(TourType::Normal, &[5]))
            .await
            .unwrap();

        // Another customer's draft still carries seat 5 from a stale page.
        let err = submit(&pool, &submittable_draft(TourType::Normal, &[5, 6]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CapacityConflict(_)));

        // Disjoint seats still go through.
        submit(&pool, &submittable_draft(TourType::Normal, &[6, 7]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_reservations_free_their_seats() {
        let pool = test_pool().await;
        let res = submit(&pool, &submittable_draft(TourType::Normal, &[1, 2]))
            .await
            .unwrap();
        sqlx::query("UPDATE reservations SET status = 'cancelled' WHERE id = ?")
            .bind(&res.id)
            .execute(&pool)
            .await
            .unwrap();

        let occupied = availability::occupied_for_slot(&pool, "b1", "2030-07-10", 0)
            .await
            .unwrap();
        assert!(occupied.is_empty());
        submit(&pool, &submittable_draft(TourType::Normal, &[1, 2]))
            .await
            .unwrap();
    }
}
