//! HTTP request handlers for the API.

mod diag;
mod events;
mod saved;
mod search;

pub use diag::{diag, diag_addr, diag_sources, health, metrics, whoami};
pub use events::{emit_event, recent_events};
pub use saved::{create_saved, delete_saved, list_saved};
pub use search::search;

use chrono::NaiveDate;

use super::error::ApiError;

/// Apply a default and require `min..=max`.
fn bounded(name: &str, value: Option<usize>, default: usize, min: usize, max: usize) -> Result<usize, ApiError> {
    let value = value.unwrap_or(default);
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::Validation(format!(
            "{} must be between {} and {}",
            name, min, max
        )))
    }
}

/// Validate an optional `YYYY-MM-DD` date. Blank means unset.
fn clean_date(value: Option<&str>) -> Result<Option<String>, ApiError> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.len() == 10 && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(Some(value.to_string()))
    } else {
        Err(ApiError::BadRequest("Dates must be YYYY-MM-DD".to_string()))
    }
}

/// Trimmed, non-empty optional filter.
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
