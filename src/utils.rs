// Utility modules

use crate::error::{AppError, Result};

/// Guard for list/query bounds to avoid expensive or nonsensical queries.
pub fn ensure_in_range(name: &str, value: i64, min: i64, max: i64) -> Result<i64> {
    if value < min || value > max {
        return Err(AppError::BadRequest(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(value)
}
