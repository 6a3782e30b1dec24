pub mod bookings;
pub mod health;
pub mod profile;
pub mod services;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;

/// `{ "success": true, "data": ... }`
pub fn success<T: Serialize>(data: T) -> Json<Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

pub fn success_with_message<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(serde_json::json!({ "success": true, "message": message, "data": data }))
}

/// Unwraps a JSON body, turning axum's rejection into the API's error envelope.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(format!("invalid request body: {}", rejection.body_text())))
}

/// Ids come from the path as text; anything that is not an integer cannot
/// name an existing record.
pub fn path_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}

/// Local calendar date used for past-date checks.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
