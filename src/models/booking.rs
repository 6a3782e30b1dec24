use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::availability::{parse_date, parse_time, Interval};
use crate::models::fields::{optional_text, parse_id, required_numeric, required_text, Numeric};

/// A booking as read back from the store, joined with its service so the
/// occupied interval can be computed without another lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub service_id: i64,
    pub service_name: String,
    pub duration_minutes: i32,
    pub client_name: String,
    pub client_contact: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn interval(&self) -> Option<Interval> {
        Interval::starting_at(
            self.appointment_date.and_time(self.appointment_time),
            self.duration_minutes,
        )
    }

    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Scheduled,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Scheduled => "scheduled",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "scheduled" => Some(BookingStatus::Scheduled),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub service_id: i64,
    pub client_name: String,
    pub client_contact: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingPatch {
    pub service_id: Option<i64>,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub status: Option<BookingStatus>,
}

impl BookingPatch {
    pub fn moves_slot(&self) -> bool {
        self.service_id.is_some() || self.appointment_date.is_some() || self.appointment_time.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
}

// ── Request payloads ──

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub service_id: Option<Numeric>,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
}

impl BookingRequest {
    pub fn validate(self) -> Result<NewBooking, AppError> {
        let service_id = required_numeric(self.service_id, "service_id")?;
        let client_name = required_text(self.client_name, "client_name")?;
        let client_contact = required_text(self.client_contact, "client_contact")?;
        let date = required_text(self.appointment_date, "appointment_date")?;
        let time = required_text(self.appointment_time, "appointment_time")?;

        Ok(NewBooking {
            service_id: parse_id(&service_id, "service_id")?,
            client_name,
            client_contact,
            appointment_date: date_field(&date)?,
            appointment_time: time_field(&time)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingUpdateRequest {
    pub service_id: Option<Numeric>,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub status: Option<String>,
}

impl BookingUpdateRequest {
    pub fn validate(self) -> Result<BookingPatch, AppError> {
        let service_id = self
            .service_id
            .map(|v| parse_id(&v, "service_id"))
            .transpose()?;
        let appointment_date = self.appointment_date.as_deref().map(date_field).transpose()?;
        let appointment_time = self.appointment_time.as_deref().map(time_field).transpose()?;
        let status = self.status.as_deref().map(status_field).transpose()?;

        Ok(BookingPatch {
            service_id,
            client_name: optional_text(self.client_name, "client_name")?,
            client_contact: optional_text(self.client_contact, "client_contact")?,
            appointment_date,
            appointment_time,
            status,
        })
    }
}

pub fn date_field(s: &str) -> Result<NaiveDate, AppError> {
    parse_date(s).ok_or_else(|| AppError::Validation("invalid date format (use YYYY-MM-DD)".into()))
}

pub fn time_field(s: &str) -> Result<NaiveTime, AppError> {
    parse_time(s).ok_or_else(|| AppError::Validation("invalid time format (use HH:MM)".into()))
}

pub fn status_field(s: &str) -> Result<BookingStatus, AppError> {
    BookingStatus::parse(s).ok_or_else(|| {
        AppError::Validation(format!(
            "invalid status: {s} (use scheduled or cancelled)"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> BookingRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_full_request() {
        let new = request(
            r#"{"service_id":"2","client_name":" Maria ","client_contact":"maria@example.com","appointment_date":"2025-06-10","appointment_time":"09:30"}"#,
        )
        .validate()
        .unwrap();

        assert_eq!(new.service_id, 2);
        assert_eq!(new.client_name, "Maria");
        assert_eq!(new.appointment_date, NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert_eq!(new.appointment_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_validate_missing_field() {
        let err = request(
            r#"{"service_id":1,"client_contact":"x","appointment_date":"2025-06-10","appointment_time":"09:30"}"#,
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("client_name")));
    }

    #[test]
    fn test_validate_bad_time() {
        let err = request(
            r#"{"service_id":1,"client_name":"a","client_contact":"b","appointment_date":"2025-06-10","appointment_time":"9h30"}"#,
        )
        .validate()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("HH:MM")));
    }

    #[test]
    fn test_update_request_partial() {
        let req: BookingUpdateRequest =
            serde_json::from_str(r#"{"appointment_time":"14:00","status":"cancelled"}"#).unwrap();
        let patch = req.validate().unwrap();

        assert_eq!(patch.appointment_time, NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(patch.status, Some(BookingStatus::Cancelled));
        assert!(patch.service_id.is_none());
        assert!(patch.moves_slot());
    }

    #[test]
    fn test_update_request_rejects_unknown_status() {
        let req: BookingUpdateRequest = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_name_only_patch_keeps_slot() {
        let req: BookingUpdateRequest =
            serde_json::from_str(r#"{"client_name":"Joana"}"#).unwrap();
        let patch = req.validate().unwrap();
        assert!(!patch.moves_slot());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [BookingStatus::Scheduled, BookingStatus::Cancelled] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("pending"), None);
    }
}
