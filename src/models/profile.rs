use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::fields::required_text;

/// The single clinic profile shown on the booking page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub full_name: String,
    pub clinic_name: String,
    pub email: String,
    pub phone: String,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub clinic_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub full_name: Option<String>,
    pub clinic_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ProfileRequest {
    pub fn validate(self) -> Result<ProfileUpdate, AppError> {
        Ok(ProfileUpdate {
            full_name: required_text(self.full_name, "full_name")?,
            clinic_name: required_text(self.clinic_name, "clinic_name")?,
            email: required_text(self.email, "email")?,
            phone: required_text(self.phone, "phone")?,
        })
    }
}
