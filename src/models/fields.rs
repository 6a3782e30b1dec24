use serde::Deserialize;

use crate::errors::AppError;

/// A JSON value that clients send either as a number or as a numeric string,
/// e.g. `"service_id": 3` or `"service_id": "3"` from a form select.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => n.as_f64(),
            Numeric::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Numeric::Text(s) if s.trim().is_empty())
    }
}

pub fn required_text(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("field {field} is required"))),
    }
}

/// Present-but-blank strings are rejected; absent ones stay `None`.
pub fn optional_text(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    value.map(|v| required_text(Some(v), field)).transpose()
}

pub fn required_numeric(value: Option<Numeric>, field: &str) -> Result<Numeric, AppError> {
    match value {
        Some(v) if !v.is_blank() => Ok(v),
        _ => Err(AppError::Validation(format!("field {field} is required"))),
    }
}

pub fn parse_id(value: &Numeric, field: &str) -> Result<i64, AppError> {
    value
        .as_i64()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::Validation(format!("field {field} must be a positive integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(json: &str) -> Numeric {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_numeric_accepts_numbers_and_strings() {
        assert_eq!(numeric("3").as_i64(), Some(3));
        assert_eq!(numeric("\"3\"").as_i64(), Some(3));
        assert_eq!(numeric("3.0").as_i64(), Some(3));
        assert_eq!(numeric("3.5").as_i64(), None);
        assert_eq!(numeric("\"49.90\"").as_f64(), Some(49.9));
        assert_eq!(numeric("\"abc\"").as_f64(), None);
    }

    #[test]
    fn test_required_text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some("  Ana ".into()), "client_name").unwrap(), "Ana");
        assert!(required_text(Some("   ".into()), "client_name").is_err());
        assert!(required_text(None, "client_name").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None, "name").unwrap(), None);
        assert_eq!(optional_text(Some(" x ".into()), "name").unwrap(), Some("x".to_string()));
        assert!(optional_text(Some("".into()), "name").is_err());
    }

    #[test]
    fn test_required_numeric_rejects_blank_string() {
        assert!(required_numeric(Some(numeric("\"\"")), "price").is_err());
        assert!(required_numeric(None, "price").is_err());
        assert!(required_numeric(Some(numeric("0")), "price").is_ok());
    }

    #[test]
    fn test_parse_id_rejects_non_positive() {
        assert_eq!(parse_id(&numeric("7"), "service_id").unwrap(), 7);
        assert!(parse_id(&numeric("0"), "service_id").is_err());
        assert!(parse_id(&numeric("\"x\""), "service_id").is_err());
    }
}
