// src/web/booking_handlers.rs
use askama::Template;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::{
    error::{AppError, AppResult},
    models::boat::{seat_code, Boat, TimeSlot},
    services::{availability, boat_service, booking, policy},
    state::AppState,
    templates::{BoatSummary, BookingPage},
};
use crate::services::booking::{BookingDraft, DRAFT_SESSION_KEY};

// --- Session draft helpers ---

async fn load_draft(session: &Session) -> AppResult<BookingDraft> {
    session
        .get::<BookingDraft>(DRAFT_SESSION_KEY)
        .await
        .map_err(|e| AppError::Session(format!("failed to read draft: {}", e)))?
        .ok_or_else(|| AppError::Validation("No booking in progress.".into()))
}

async fn save_draft(session: &Session, draft: &BookingDraft) -> AppResult {
    session
        .insert(DRAFT_SESSION_KEY, draft)
        .await
        .map_err(|e| AppError::Session(format!("failed to store draft: {}", e)))
}

fn draft_view(draft: &BookingDraft) -> serde_json::Value {
    json!({ "step": draft.step(), "draft": draft })
}

// --- Landing page ---

pub async fn booking_page(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let boats = boat_service::list_boats(&state.db_pool).await?;
    let template = BookingPage {
        boats: boats
            .into_iter()
            .map(|b| BoatSummary {
                id: b.id,
                name: b.name,
                capacity: b.capacity,
            })
            .collect(),
    };
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("failed to render booking page: {}", e);
            Ok((StatusCode::INTERNAL_SERVER_ERROR, "Page error.").into_response())
        }
    }
}

// --- Read API: boats, tours, availability ---

#[derive(Serialize)]
pub struct SeatView {
    pub number: i64,
    pub code: Option<String>,
    pub side: Option<&'static str>,
}

#[derive(Serialize)]
pub struct BoatView {
    pub id: String,
    pub name: String,
    pub code: String,
    pub capacity: i64,
    pub seat_layout: String,
    pub time_slots: Vec<TimeSlot>,
    pub seat_price: f64,
    pub charter_price: f64,
    pub start_date: String,
    pub end_date: String,
    pub seats: Vec<SeatView>,
}

fn boat_view(boat: Boat) -> BoatView {
    let layout = boat.layout();
    let seats = (1..=boat.capacity)
        .map(|n| SeatView {
            number: n,
            code: seat_code(n, &boat.code, boat.capacity, layout),
            side: crate::models::boat::seat_side(n, boat.capacity, layout)
                .map(|(side, _)| side.label()),
        })
        .collect();
    BoatView {
        time_slots: boat.slots(),
        seats,
        id: boat.id,
        name: boat.name,
        code: boat.code,
        capacity: boat.capacity,
        seat_layout: boat.seat_layout,
        seat_price: boat.seat_price,
        charter_price: boat.charter_price,
        start_date: boat.start_date,
        end_date: boat.end_date,
    }
}

pub async fn list_boats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let boats = boat_service::list_boats(&state.db_pool).await?;
    Ok(Json(
        boats.into_iter().map(boat_view).collect::<Vec<_>>(),
    ))
}

pub async fn get_boat(
    State(state): State<AppState>,
    Path(boat_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let boat = boat_service::find_boat(&state.db_pool, &boat_id).await?;
    Ok(Json(boat_view(boat)))
}

pub async fn list_tours(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let tours = boat_service::active_custom_tours(&state.db_pool).await?;
    Ok(Json(tours))
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

/// Calendar feed: one 0 / 0.5 / 1 signal per day of the month.
pub async fn month_availability(
    State(state): State<AppState>,
    Path(boat_id): Path<String>,
    Query(q): Query<CalendarQuery>,
) -> AppResult<impl IntoResponse> {
    let boat = boat_service::find_boat(&state.db_pool, &boat_id).await?;
    let slot_count = boat.slots().len();
    if slot_count == 0 {
        return Ok(Json(json!({ "days": {}, "no_slots": true })));
    }
    let first = format!("{:04}-{:02}-01", q.year, q.month);
    let last = format!("{:04}-{:02}-31", q.year, q.month);
    let rows = availability::active_for_range(&state.db_pool, &boat.id, &first, &last).await?;
    let days = availability::fullness_for_month(q.year, q.month, &rows, slot_count, boat.capacity);
    Ok(Json(json!({ "days": days, "no_slots": false })))
}

#[derive(Deserialize)]
pub struct DayQuery {
    pub date: String,
}

#[derive(Serialize)]
pub struct SlotAvailability {
    pub slot_id: i64,
    pub start: String,
    pub end: String,
    pub display_name: String,
    pub fullness: f64,
    pub bait_warning: bool,
    pub overnight: bool,
}

/// Per-slot fullness for the time-slot picker, plus the confirmation flags
/// the UI must collect before a slot can be finalized.
pub async fn day_availability(
    State(state): State<AppState>,
    Path(boat_id): Path<String>,
    Query(q): Query<DayQuery>,
) -> AppResult<impl IntoResponse> {
    let boat = boat_service::find_boat(&state.db_pool, &boat_id).await?;
    let slots = boat.slots();
    if slots.is_empty() {
        return Err(AppError::ConfigurationAbsent(
            "This boat has no time slots configured.".into(),
        ));
    }
    let rows = availability::active_for_date(&state.db_pool, &boat.id, &q.date).await?;
    let per_slot = availability::fullness_for_all_slots(&rows, slots.len(), boat.capacity);
    let out: Vec<SlotAvailability> = slots
        .into_iter()
        .enumerate()
        .map(|(i, s)| SlotAvailability {
            slot_id: i as i64,
            fullness: per_slot.get(&(i as i64)).copied().unwrap_or(0.0),
            overnight: policy::requires_overnight_confirmation(&state.policy, &s.start, &s.end),
            bait_warning: s.bait_warning,
            start: s.start,
            end: s.end,
            display_name: s.display_name,
        })
        .collect();
    Ok(Json(out))
}

// --- Draft transitions ---

#[derive(Deserialize)]
pub struct StartPayload {
    pub boat_id: String,
}

pub async fn start_booking(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<StartPayload>,
) -> AppResult<impl IntoResponse> {
    // Validates the boat exists before a draft is created for it.
    let boat = boat_service::find_boat(&state.db_pool, &payload.boat_id).await?;
    let draft = BookingDraft::new(&boat.id);
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

pub async fn current_draft(session: Session) -> AppResult<impl IntoResponse> {
    let draft = load_draft(&session).await?;
    Ok(Json(draft_view(&draft)))
}

#[derive(Deserialize)]
pub struct TourTypePayload {
    pub tour_type: String,
}

pub async fn select_tour_type(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<TourTypePayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    booking::select_tour_type(&state.db_pool, &mut draft, &payload.tour_type).await?;
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

#[derive(Deserialize)]
pub struct PartyPayload {
    pub adults: i64,
    #[serde(default)]
    pub children: i64,
    #[serde(default)]
    pub babies: i64,
}

pub async fn select_party(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<PartyPayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    booking::select_party(
        &state.db_pool,
        &mut draft,
        payload.adults,
        payload.children,
        payload.babies,
    )
    .await?;
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

#[derive(Deserialize)]
pub struct DatePayload {
    pub date: String,
}

pub async fn select_date(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<DatePayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    booking::select_date(&state.db_pool, &mut draft, &payload.date).await?;
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

#[derive(Deserialize)]
pub struct SlotPayload {
    pub slot_id: i64,
    #[serde(default)]
    pub bait_acknowledged: bool,
    #[serde(default)]
    pub overnight_confirmed: bool,
}

pub async fn select_slot(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SlotPayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    booking::select_slot(
        &state.db_pool,
        &state.policy,
        &mut draft,
        payload.slot_id,
        payload.bait_acknowledged,
        payload.overnight_confirmed,
    )
    .await?;
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

#[derive(Deserialize)]
pub struct SeatPayload {
    pub seat: i64,
}

pub async fn toggle_seat(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SeatPayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    let outcome = booking::toggle_seat(&state.db_pool, &mut draft, payload.seat).await?;
    save_draft(&session, &draft).await?;
    Ok(Json(json!({
        "outcome": outcome,
        "step": draft.step(),
        "draft": draft,
    })))
}

#[derive(Deserialize)]
pub struct ContactPayload {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Option<String>,
}

pub async fn set_contact(
    session: Session,
    Json(payload): Json<ContactPayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    draft.set_contact(&payload.name, &payload.surname, &payload.phone, payload.email)?;
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

#[derive(Deserialize)]
pub struct BackPayload {
    pub step: booking::BookingStep,
}

pub async fn go_back(
    session: Session,
    Json(payload): Json<BackPayload>,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    draft.back_to(payload.step);
    save_draft(&session, &draft).await?;
    Ok(Json(draft_view(&draft)))
}

/// Final submit. On a capacity conflict the draft is rewound to slot
/// selection and stored, so the customer lands back on a refreshed picker
/// rather than a dead end.
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<impl IntoResponse> {
    let mut draft = load_draft(&session).await?;
    match booking::submit(&state.db_pool, &draft).await {
        Ok(reservation) => {
            session
                .remove::<BookingDraft>(DRAFT_SESSION_KEY)
                .await
                .map_err(|e| AppError::Session(format!("failed to clear draft: {}", e)))?;
            Ok(Json(json!({
                "reservation_number": reservation.reservation_number,
                "status": reservation.status,
                "date": reservation.date,
                "time_slot_id": reservation.time_slot_id,
                "selected_seats": reservation.seats(),
                "total_price": reservation.total_price,
            }))
            .into_response())
        }
        Err(AppError::CapacityConflict(msg)) => {
            draft.back_to(booking::BookingStep::SlotSelection);
            save_draft(&session, &draft).await?;
            Err(AppError::CapacityConflict(msg))
        }
        Err(e) => Err(e),
    }
}

pub async fn reset(session: Session) -> AppResult<impl IntoResponse> {
    session
        .remove::<BookingDraft>(DRAFT_SESSION_KEY)
        .await
        .map_err(|e| AppError::Session(format!("failed to clear draft: {}", e)))?;
    Ok(StatusCode::NO_CONTENT)
}
