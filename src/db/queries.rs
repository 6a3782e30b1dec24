use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};

use crate::models::availability::{DATE_FORMAT, TIME_FORMAT};
use crate::models::{
    Booking, BookingFilter, BookingStatus, NewBooking, NewService, Profile, ProfileUpdate,
    Service,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("malformed timestamp in database: {s}"))
}

// ── Profile ──

/// Inserts the empty profile row if it is missing. Safe to call repeatedly.
pub fn ensure_profile(conn: &Connection) -> anyhow::Result<()> {
    let inserted = conn.execute("INSERT OR IGNORE INTO profile (id) VALUES (1)", [])?;
    if inserted > 0 {
        tracing::info!("created default clinic profile");
    }
    Ok(())
}

pub fn get_profile(conn: &Connection) -> anyhow::Result<Option<Profile>> {
    let result = conn.query_row(
        "SELECT id, full_name, clinic_name, email, phone, avatar_url, created_at, updated_at
         FROM profile WHERE id = 1",
        [],
        |row| Ok(parse_profile_row(row)),
    );

    match result {
        Ok(profile) => Ok(Some(profile?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_profile(conn: &Connection, update: &ProfileUpdate) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO profile (id, full_name, clinic_name, email, phone)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
           full_name = excluded.full_name,
           clinic_name = excluded.clinic_name,
           email = excluded.email,
           phone = excluded.phone,
           updated_at = datetime('now')",
        params![update.full_name, update.clinic_name, update.email, update.phone],
    )?;
    Ok(())
}

fn parse_profile_row(row: &rusqlite::Row) -> anyhow::Result<Profile> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(Profile {
        id: row.get(0)?,
        full_name: row.get(1)?,
        clinic_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        avatar_url: row.get(5)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// ── Services ──

const SERVICE_COLUMNS: &str =
    "id, name, duration_minutes, price, description, created_at, updated_at";

pub fn list_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SERVICE_COLUMNS} FROM services ORDER BY created_at DESC, id DESC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_service_row(row)))?;

    let mut services = vec![];
    for row in rows {
        services.push(row??);
    }
    Ok(services)
}

pub fn get_service(conn: &Connection, id: i64) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
        params![id],
        |row| Ok(parse_service_row(row)),
    );

    match result {
        Ok(service) => Ok(Some(service?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn create_service(conn: &Connection, service: &NewService) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO services (name, duration_minutes, price, description) VALUES (?1, ?2, ?3, ?4)",
        params![
            service.name,
            service.duration_minutes,
            service.price,
            service.description
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_service(conn: &Connection, service: &Service) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE services SET name = ?1, duration_minutes = ?2, price = ?3, description = ?4,
           updated_at = datetime('now')
         WHERE id = ?5",
        params![
            service.name,
            service.duration_minutes,
            service.price,
            service.description,
            service.id
        ],
    )?;
    Ok(count > 0)
}

pub fn delete_service(conn: &Connection, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM services WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

/// Counts bookings of any status that reference the service.
pub fn count_bookings_for_service(conn: &Connection, service_id: i64) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE service_id = ?1",
        params![service_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn parse_service_row(row: &rusqlite::Row) -> anyhow::Result<Service> {
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;

    Ok(Service {
        id: row.get(0)?,
        name: row.get(1)?,
        duration_minutes: row.get(2)?,
        price: row.get(3)?,
        description: row.get(4)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// ── Bookings ──

// Joined with services so every row carries the duration that defines its interval.
const BOOKING_SELECT: &str =
    "SELECT b.id, b.service_id, s.name, s.duration_minutes, b.client_name, b.client_contact,
            b.appointment_date, b.appointment_time, b.status, b.created_at, b.updated_at
     FROM bookings b
     JOIN services s ON s.id = b.service_id";

pub fn create_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO bookings (service_id, client_name, client_contact, appointment_date, appointment_time, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            booking.service_id,
            booking.client_name,
            booking.client_contact,
            booking.appointment_date.format(DATE_FORMAT).to_string(),
            booking.appointment_time.format(TIME_FORMAT).to_string(),
            BookingStatus::Scheduled.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("{BOOKING_SELECT} WHERE b.id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Non-cancelled bookings on a single day, earliest first.
pub fn get_active_bookings_on(conn: &Connection, date: NaiveDate) -> anyhow::Result<Vec<Booking>> {
    get_active_bookings_between(conn, date, date)
}

/// Non-cancelled bookings with `start <= date <= end`, ordered by date then time.
pub fn get_active_bookings_between(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "{BOOKING_SELECT}
         WHERE b.appointment_date >= ?1 AND b.appointment_date <= ?2 AND b.status != 'cancelled'
         ORDER BY b.appointment_date ASC, b.appointment_time ASC"
    ))?;

    let rows = stmt.query_map(
        params![
            start.format(DATE_FORMAT).to_string(),
            end.format(DATE_FORMAT).to_string()
        ],
        |row| Ok(parse_booking_row(row)),
    )?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// All bookings matching the filter, most recent appointment first.
pub fn list_bookings(conn: &Connection, filter: &BookingFilter) -> anyhow::Result<Vec<Booking>> {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

    if let Some(start) = filter.start_date {
        params_vec.push(Box::new(start.format(DATE_FORMAT).to_string()));
        clauses.push(format!("b.appointment_date >= ?{}", params_vec.len()));
    }
    if let Some(end) = filter.end_date {
        params_vec.push(Box::new(end.format(DATE_FORMAT).to_string()));
        clauses.push(format!("b.appointment_date <= ?{}", params_vec.len()));
    }
    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.as_str()));
        clauses.push(format!("b.status = ?{}", params_vec.len()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "{BOOKING_SELECT}{where_clause} ORDER BY b.appointment_date DESC, b.appointment_time DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Writes every mutable field of the booking back to the store.
pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET service_id = ?1, client_name = ?2, client_contact = ?3,
           appointment_date = ?4, appointment_time = ?5, status = ?6, updated_at = datetime('now')
         WHERE id = ?7",
        params![
            booking.service_id,
            booking.client_name,
            booking.client_contact,
            booking.appointment_date.format(DATE_FORMAT).to_string(),
            booking.appointment_time.format(TIME_FORMAT).to_string(),
            booking.status.as_str(),
            booking.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(6)?;
    let time_str: String = row.get(7)?;
    let status_str: String = row.get(8)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    let appointment_date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .with_context(|| format!("malformed appointment date in database: {date_str}"))?;
    let appointment_time = NaiveTime::parse_from_str(&time_str, TIME_FORMAT)
        .with_context(|| format!("malformed appointment time in database: {time_str}"))?;
    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("unknown booking status in database: {status_str}"))?;

    Ok(Booking {
        id: row.get(0)?,
        service_id: row.get(1)?,
        service_name: row.get(2)?,
        duration_minutes: row.get(3)?,
        client_name: row.get(4)?,
        client_contact: row.get(5)?,
        appointment_date,
        appointment_time,
        status,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
