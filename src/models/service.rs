use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::fields::{optional_text, required_numeric, required_text, Numeric};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub description: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Service {
    pub fn apply(&mut self, patch: ServicePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(duration) = patch.duration_minutes {
            self.duration_minutes = duration;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub name: String,
    pub duration_minutes: i32,
    pub price: f64,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub duration_minutes: Option<i32>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub name: Option<String>,
    pub duration_minutes: Option<Numeric>,
    pub price: Option<Numeric>,
    pub description: Option<String>,
}

impl ServiceRequest {
    pub fn validate(self) -> Result<NewService, AppError> {
        let name = required_text(self.name, "name")?;
        let duration = required_numeric(self.duration_minutes, "duration_minutes")?;
        let price = required_numeric(self.price, "price")?;

        Ok(NewService {
            name,
            duration_minutes: duration_field(&duration)?,
            price: price_field(&price)?,
            description: self.description.unwrap_or_default().trim().to_string(),
        })
    }

    pub fn validate_patch(self) -> Result<ServicePatch, AppError> {
        Ok(ServicePatch {
            name: optional_text(self.name, "name")?,
            duration_minutes: self.duration_minutes.as_ref().map(duration_field).transpose()?,
            price: self.price.as_ref().map(price_field).transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }
}

fn duration_field(value: &Numeric) -> Result<i32, AppError> {
    let minutes = value
        .as_i64()
        .ok_or_else(|| AppError::Validation("duration_minutes must be an integer".into()))?;
    if minutes <= 0 {
        return Err(AppError::Validation("duration_minutes must be greater than zero".into()));
    }
    i32::try_from(minutes)
        .map_err(|_| AppError::Validation("duration_minutes is too large".into()))
}

fn price_field(value: &Numeric) -> Result<f64, AppError> {
    let price = value
        .as_f64()
        .ok_or_else(|| AppError::Validation("price must be a number".into()))?;
    if price < 0.0 {
        return Err(AppError::Validation("price cannot be negative".into()));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ServiceRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_accepts_string_numbers() {
        let new = request(r#"{"name":" Limpeza ","duration_minutes":"45","price":"120.5"}"#)
            .validate()
            .unwrap();
        assert_eq!(new.name, "Limpeza");
        assert_eq!(new.duration_minutes, 45);
        assert_eq!(new.price, 120.5);
        assert_eq!(new.description, "");
    }

    #[test]
    fn test_validate_rejects_zero_duration() {
        let err = request(r#"{"name":"x","duration_minutes":0,"price":10}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("greater than zero")));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let err = request(r#"{"name":"x","duration_minutes":30,"price":-1}"#)
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("negative")));
    }

    #[test]
    fn test_validate_requires_price() {
        let err = request(r#"{"name":"x","duration_minutes":30}"#).validate().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.contains("price")));
    }

    #[test]
    fn test_patch_applies_only_given_fields() {
        let mut service = Service {
            id: 1,
            name: "Consulta".into(),
            duration_minutes: 30,
            price: 100.0,
            description: "".into(),
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        };
        let patch = request(r#"{"duration_minutes":60}"#).validate_patch().unwrap();
        service.apply(patch);

        assert_eq!(service.duration_minutes, 60);
        assert_eq!(service.name, "Consulta");
        assert_eq!(service.price, 100.0);
    }

    #[test]
    fn test_patch_rejects_blank_name() {
        assert!(request(r#"{"name":"  "}"#).validate_patch().is_err());
    }
}
