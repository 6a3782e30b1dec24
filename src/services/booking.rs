use anyhow::anyhow;
use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::availability::TIME_FORMAT;
use crate::models::{Booking, BookingPatch, BookingStatus, NewBooking};
use crate::services::scheduling::{ensure_not_past, find_service, validate_booking_time};

// Writes run in an IMMEDIATE transaction: the write lock is held from the
// overlap scan through the insert. Returning early drops the transaction,
// which rolls it back.

pub fn create_booking(
    conn: &mut Connection,
    new: &NewBooking,
    today: NaiveDate,
) -> Result<Booking, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let service = find_service(&tx, new.service_id)?;
    ensure_not_past(new.appointment_date, today)?;
    validate_booking_time(
        &tx,
        new.appointment_date,
        new.appointment_time,
        service.duration_minutes,
        None,
    )?;

    let id = queries::create_booking(&tx, new)?;
    let booking = load(&tx, id)?;
    tx.commit()?;

    tracing::info!(
        booking_id = id,
        service_id = new.service_id,
        date = %new.appointment_date,
        time = %new.appointment_time.format(TIME_FORMAT),
        "booking created"
    );
    Ok(booking)
}

pub fn update_booking(
    conn: &mut Connection,
    id: i64,
    patch: BookingPatch,
    today: NaiveDate,
) -> Result<Booking, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut booking = queries::get_booking_by_id(&tx, id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    if booking.status == BookingStatus::Cancelled {
        if patch.status == Some(BookingStatus::Scheduled) {
            return Err(AppError::Conflict(
                "a cancelled booking cannot be scheduled again".to_string(),
            ));
        }
        if patch.moves_slot() {
            return Err(AppError::Conflict(
                "a cancelled booking cannot be rescheduled".to_string(),
            ));
        }
    }

    if let Some(service_id) = patch.service_id {
        let service = find_service(&tx, service_id)?;
        booking.service_id = service.id;
        booking.service_name = service.name;
        booking.duration_minutes = service.duration_minutes;
    }
    if let Some(date) = patch.appointment_date {
        ensure_not_past(date, today)?;
        booking.appointment_date = date;
    }
    if let Some(time) = patch.appointment_time {
        booking.appointment_time = time;
    }
    if let Some(name) = patch.client_name.clone() {
        booking.client_name = name;
    }
    if let Some(contact) = patch.client_contact.clone() {
        booking.client_contact = contact;
    }
    if let Some(status) = patch.status {
        booking.status = status;
    }

    if patch.moves_slot() && booking.is_active() {
        validate_booking_time(
            &tx,
            booking.appointment_date,
            booking.appointment_time,
            booking.duration_minutes,
            Some(id),
        )?;
    }

    queries::update_booking(&tx, &booking)?;
    let booking = load(&tx, id)?;
    tx.commit()?;

    tracing::info!(booking_id = id, status = booking.status.as_str(), "booking updated");
    Ok(booking)
}

/// Marks the booking cancelled. Cancelling twice is not an error.
pub fn cancel_booking(conn: &Connection, id: i64) -> Result<Booking, AppError> {
    let booking = queries::get_booking_by_id(conn, id)?
        .ok_or_else(|| AppError::NotFound("booking not found".to_string()))?;

    if booking.status == BookingStatus::Cancelled {
        tracing::debug!(booking_id = id, "booking already cancelled");
        return Ok(booking);
    }

    queries::update_booking_status(conn, id, BookingStatus::Cancelled)?;
    tracing::info!(booking_id = id, "booking cancelled");
    load(conn, id)
}

fn load(conn: &Connection, id: i64) -> Result<Booking, AppError> {
    queries::get_booking_by_id(conn, id)?
        .ok_or_else(|| AppError::Internal(anyhow!("booking {id} missing after write")))
}
