use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Booking;

pub const YEAR_RANGE: RangeInclusive<i32> = 2020..=2030;

/// First and last day of the month.
pub fn month_bounds(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate), AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation("month must be between 1 and 12".into()));
    }
    if !YEAR_RANGE.contains(&year) {
        return Err(AppError::Validation(format!(
            "year must be between {} and {}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("invalid month: {year}-{month}")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| AppError::Validation(format!("invalid month: {year}-{month}")))?;

    Ok((first, last))
}

/// Non-cancelled bookings of the month grouped by day. Days without bookings
/// are absent; each day's bookings are ordered by time.
pub fn calendar_bookings(
    conn: &Connection,
    month: u32,
    year: i32,
) -> Result<BTreeMap<NaiveDate, Vec<Booking>>, AppError> {
    let (first, last) = month_bounds(month, year)?;

    let mut calendar: BTreeMap<NaiveDate, Vec<Booking>> = BTreeMap::new();
    for booking in queries::get_active_bookings_between(conn, first, last)? {
        calendar
            .entry(booking.appointment_date)
            .or_default()
            .push(booking);
    }
    Ok(calendar)
}
