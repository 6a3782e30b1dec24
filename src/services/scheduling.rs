use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::availability::TIME_FORMAT;
use crate::models::{BusinessHours, Interval, Service};

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("cannot book a date in the past ({date})")]
    PastDate { date: NaiveDate },

    #[error("time slot {start}-{end} is not available")]
    Conflict { start: String, end: String },
}

pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), SchedulingError> {
    if date < today {
        return Err(SchedulingError::PastDate { date });
    }
    Ok(())
}

/// Start times on `date` where an appointment of `duration_minutes` fits
/// before closing and overlaps none of the `occupied` intervals.
pub fn free_slots(
    date: NaiveDate,
    duration_minutes: i32,
    hours: &BusinessHours,
    occupied: &[Interval],
) -> Vec<NaiveTime> {
    hours
        .candidate_starts(date)
        .into_iter()
        .filter_map(|start| Interval::starting_at(start, duration_minutes))
        .filter(|candidate| hours.fits(candidate))
        .filter(|candidate| !occupied.iter().any(|taken| candidate.overlaps(taken)))
        .map(|candidate| candidate.start.time())
        .collect()
}

pub fn available_slots(
    conn: &Connection,
    date: NaiveDate,
    service_id: i64,
    hours: &BusinessHours,
) -> Result<Vec<NaiveTime>, AppError> {
    let service = find_service(conn, service_id)?;

    let occupied: Vec<Interval> = queries::get_active_bookings_on(conn, date)?
        .iter()
        .filter_map(|b| b.interval())
        .collect();

    let slots = free_slots(date, service.duration_minutes, hours, &occupied);
    tracing::debug!(
        %date,
        service_id,
        booked = occupied.len(),
        free = slots.len(),
        "computed available slots"
    );
    Ok(slots)
}

/// Rejects the proposed appointment if it overlaps any non-cancelled booking
/// on the same day. `exclude` skips the booking being rescheduled.
pub fn validate_booking_time(
    conn: &Connection,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: i32,
    exclude: Option<i64>,
) -> Result<(), AppError> {
    let proposed = Interval::starting_at(date.and_time(time), duration_minutes)
        .ok_or_else(|| AppError::Validation("appointment ends outside the supported calendar".into()))?;

    let bookings = queries::get_active_bookings_on(conn, date)?;
    let conflict = bookings
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .find(|b| b.interval().is_some_and(|taken| taken.overlaps(&proposed)));

    if let Some(existing) = conflict {
        tracing::warn!(
            %date,
            requested = %time.format(TIME_FORMAT),
            conflicting_booking = existing.id,
            "booking conflict"
        );
        return Err(SchedulingError::Conflict {
            start: proposed.start.format(TIME_FORMAT).to_string(),
            end: proposed.end.format(TIME_FORMAT).to_string(),
        }
        .into());
    }

    Ok(())
}

pub fn find_service(conn: &Connection, service_id: i64) -> Result<Service, AppError> {
    queries::get_service(conn, service_id)?
        .ok_or_else(|| AppError::NotFound("service not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{BookingStatus, NewBooking, NewService};
    use chrono::{Duration, NaiveDateTime, Timelike};

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn add_service(conn: &Connection, duration: i32) -> i64 {
        queries::create_service(
            conn,
            &NewService {
                name: format!("Servico {duration}min"),
                duration_minutes: duration,
                price: 100.0,
                description: String::new(),
            },
        )
        .unwrap()
    }

    fn add_booking(conn: &Connection, service_id: i64, day: &str, at: &str) -> i64 {
        queries::create_booking(
            conn,
            &NewBooking {
                service_id,
                client_name: "Existing".to_string(),
                client_contact: "+5511900000000".to_string(),
                appointment_date: date(day),
                appointment_time: time(at),
            },
        )
        .unwrap()
    }

    fn hhmm(slots: &[NaiveTime]) -> Vec<String> {
        slots.iter().map(|t| t.format("%H:%M").to_string()).collect()
    }

    #[test]
    fn test_free_slots_empty_day_60_minutes() {
        let slots = free_slots(date("2025-06-10"), 60, &BusinessHours::default(), &[]);
        let slots = hhmm(&slots);
        assert_eq!(slots.first().map(String::as_str), Some("08:00"));
        assert_eq!(slots.last().map(String::as_str), Some("17:00"));
        assert_eq!(slots.len(), 19);
    }

    #[test]
    fn test_free_slots_respect_grid_and_closing_time() {
        let hours = BusinessHours::default();
        for duration in [15, 30, 45, 60, 90, 240, 600] {
            let day = date("2025-06-10");
            for start in free_slots(day, duration, &hours, &[]) {
                assert_eq!(start.minute() % 30, 0);
                assert!(start >= time("08:00"));
                let end = day.and_time(start) + Duration::minutes(duration as i64);
                assert!(end <= dt("2025-06-10 18:00"), "{start} + {duration}min ends after close");
            }
        }
    }

    #[test]
    fn test_free_slots_longer_than_day_is_empty() {
        let slots = free_slots(date("2025-06-10"), 601, &BusinessHours::default(), &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn test_available_slots_exclude_existing_booking() {
        let conn = setup_db();
        let service_id = add_service(&conn, 60);
        add_booking(&conn, service_id, "2025-06-10", "09:00");

        let slots = available_slots(&conn, date("2025-06-10"), service_id, &BusinessHours::default())
            .unwrap();
        let slots = hhmm(&slots);

        assert!(!slots.contains(&"09:00".to_string()));
        assert!(!slots.contains(&"09:30".to_string()));
        // 08:30 ends exactly when the existing booking starts.
        for expected in ["08:00", "08:30", "10:00", "12:30", "17:00"] {
            assert!(slots.contains(&expected.to_string()), "missing {expected}");
        }
        assert!(!slots.contains(&"17:30".to_string()));
    }

    #[test]
    fn test_available_slots_use_each_bookings_own_duration() {
        let conn = setup_db();
        let long = add_service(&conn, 90);
        let short = add_service(&conn, 30);
        add_booking(&conn, long, "2025-06-10", "10:00");

        let slots = available_slots(&conn, date("2025-06-10"), short, &BusinessHours::default())
            .unwrap();
        let slots = hhmm(&slots);

        for blocked in ["10:00", "10:30", "11:00"] {
            assert!(!slots.contains(&blocked.to_string()), "{blocked} should be taken");
        }
        assert!(slots.contains(&"09:30".to_string()));
        assert!(slots.contains(&"11:30".to_string()));
    }

    #[test]
    fn test_available_slots_ignore_cancelled() {
        let conn = setup_db();
        let service_id = add_service(&conn, 60);
        let id = add_booking(&conn, service_id, "2025-06-10", "09:00");
        queries::update_booking_status(&conn, id, BookingStatus::Cancelled).unwrap();

        let slots = available_slots(&conn, date("2025-06-10"), service_id, &BusinessHours::default())
            .unwrap();
        assert!(hhmm(&slots).contains(&"09:00".to_string()));
    }

    #[test]
    fn test_available_slots_unknown_service() {
        let conn = setup_db();
        let result = available_slots(&conn, date("2025-06-10"), 999, &BusinessHours::default());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_conflict_with_existing_booking() {
        let conn = setup_db();
        let service_id = add_service(&conn, 60);
        add_booking(&conn, service_id, "2025-06-10", "10:00");

        // 10:30 overlaps 10:00-11:00
        let result = validate_booking_time(&conn, date("2025-06-10"), time("10:30"), 60, None);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_no_conflict_adjacent_booking() {
        let conn = setup_db();
        let service_id = add_service(&conn, 60);
        add_booking(&conn, service_id, "2025-06-10", "10:00");

        // 11:00 starts exactly when the previous one ends
        let result = validate_booking_time(&conn, date("2025-06-10"), time("11:00"), 60, None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_no_conflict_other_day() {
        let conn = setup_db();
        let service_id = add_service(&conn, 60);
        add_booking(&conn, service_id, "2025-06-10", "10:00");

        let result = validate_booking_time(&conn, date("2025-06-11"), time("10:00"), 60, None);
        assert!(result.is_ok());
    }

    #[test]
    fn test_excluded_booking_does_not_conflict_with_itself() {
        let conn = setup_db();
        let service_id = add_service(&conn, 60);
        let id = add_booking(&conn, service_id, "2025-06-10", "10:00");

        let result = validate_booking_time(&conn, date("2025-06-10"), time("10:30"), 60, Some(id));
        assert!(result.is_ok());
    }

    #[test]
    fn test_ensure_not_past() {
        let today = date("2025-06-10");
        assert!(ensure_not_past(today, today).is_ok());
        assert!(ensure_not_past(date("2025-06-11"), today).is_ok());
        assert!(matches!(
            ensure_not_past(date("2025-06-09"), today),
            Err(SchedulingError::PastDate { .. })
        ));
    }
}
