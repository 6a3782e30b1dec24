use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{json_body, path_id, success, success_with_message, today};
use crate::models::availability::{DATE_FORMAT, TIME_FORMAT};
use crate::models::booking::{date_field, status_field, BookingRequest, BookingUpdateRequest};
use crate::models::{Booking, BookingFilter};
use crate::services::{booking, calendar, scheduling};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BookingResponse {
    id: i64,
    service_id: i64,
    service_name: String,
    duration_minutes: i32,
    client_name: String,
    client_contact: String,
    appointment_date: String,
    appointment_time: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            service_id: b.service_id,
            service_name: b.service_name,
            duration_minutes: b.duration_minutes,
            client_name: b.client_name,
            client_contact: b.client_contact,
            appointment_date: b.appointment_date.format(DATE_FORMAT).to_string(),
            appointment_time: b.appointment_time.format(TIME_FORMAT).to_string(),
            status: b.status.as_str().to_string(),
            created_at: b.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            updated_at: b.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

impl BookingsQuery {
    fn into_filter(self) -> Result<BookingFilter, AppError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Ok(BookingFilter {
            start_date: non_empty(self.start_date)
                .map(|s| date_field(&s))
                .transpose()
                .map_err(|_| AppError::Validation("invalid start_date (use YYYY-MM-DD)".into()))?,
            end_date: non_empty(self.end_date)
                .map(|s| date_field(&s))
                .transpose()
                .map_err(|_| AppError::Validation("invalid end_date (use YYYY-MM-DD)".into()))?,
            status: non_empty(self.status).map(|s| status_field(&s)).transpose()?,
        })
    }
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = query.into_filter()?;

    let bookings = {
        let db = state.db()?;
        queries::list_bookings(&db, &filter)?
    };

    let response: Vec<BookingResponse> = bookings.into_iter().map(BookingResponse::from).collect();
    Ok(success(response))
}

// GET /api/bookings/calendar/:month/:year
pub async fn calendar_bookings(
    State(state): State<Arc<AppState>>,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let month: u32 = month
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("month must be between 1 and 12".into()))?;
    let year: i32 = year
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("year must be a number".into()))?;

    let grouped = {
        let db = state.db()?;
        calendar::calendar_bookings(&db, month, year)?
    };

    let response: BTreeMap<String, Vec<BookingResponse>> = grouped
        .into_iter()
        .map(|(date, bookings)| {
            (
                date.format(DATE_FORMAT).to_string(),
                bookings.into_iter().map(BookingResponse::from).collect(),
            )
        })
        .collect();

    Ok(success(response))
}

// GET /api/bookings/available-times/:date/:service_id
pub async fn available_times(
    State(state): State<Arc<AppState>>,
    Path((date, service_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let date = date_field(&date)?;
    let service_id = path_id(&service_id, "service")?;

    let slots = {
        let db = state.db()?;
        scheduling::available_slots(&db, date, service_id, &state.hours)?
    };

    let response: Vec<String> = slots
        .iter()
        .map(|t| t.format(TIME_FORMAT).to_string())
        .collect();
    Ok(success(response))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = json_body(payload)?.validate()?;

    let created = {
        let mut db = state.db()?;
        booking::create_booking(&mut db, &new, today())?
    };

    Ok((
        StatusCode::CREATED,
        success_with_message("booking created", BookingResponse::from(created)),
    ))
}

// PUT /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<BookingUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id, "booking")?;
    let patch = json_body(payload)?.validate()?;

    let updated = {
        let mut db = state.db()?;
        booking::update_booking(&mut db, id, patch, today())?
    };

    Ok(success_with_message("booking updated", BookingResponse::from(updated)))
}

// DELETE /api/bookings/:id
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = path_id(&id, "booking")?;

    let cancelled = {
        let db = state.db()?;
        booking::cancel_booking(&db, id)?
    };

    Ok(success_with_message("booking cancelled", BookingResponse::from(cancelled)))
}
