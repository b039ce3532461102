//! Helpers for turning form-urlencoded text fields into typed values.
//!
//! A field that is missing or blank counts as "not supplied".

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::AppError;

pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn require<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Field '{}' is required", field)))
}

pub fn parse_int(field: &str, value: Option<&str>) -> Result<Option<i64>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Field '{}' must be an integer", field))),
        None => Ok(None),
    }
}

pub fn parse_bool(field: &str, value: Option<&str>) -> Result<Option<bool>, AppError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(Some(true)),
        "false" | "0" | "off" | "no" => Ok(Some(false)),
        _ => Err(AppError::Validation(format!(
            "Field '{}' must be a boolean",
            field
        ))),
    }
}

/// Accepts RFC 3339 timestamps (converted to UTC) or plain `YYYY-MM-DD` dates.
pub fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>, AppError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(timestamp.naive_utc()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Some)
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Field '{}' must be an RFC 3339 timestamp or YYYY-MM-DD date",
                field
            ))
        })
}

/// Parses a JSON array of class ids such as `[1,2]`.
pub fn parse_id_list(field: &str, value: Option<&str>) -> Result<Option<Vec<i64>>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(raw) => serde_json::from_str::<Vec<i64>>(raw).map(Some).map_err(|e| {
            AppError::Validation(format!(
                "Field '{}' must be a JSON array of ids: {}",
                field, e
            ))
        }),
        None => Ok(None),
    }
}
