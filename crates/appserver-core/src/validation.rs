//! Request validation done before any downstream call

use time::Date;

use crate::CoreError;

pub fn validate_booking_dates(date_from: Date, date_to: Date) -> Result<(), CoreError> {
    if date_to < date_from {
        return Err(CoreError::Validation(format!(
            "date_to {} can't be before date_from {}",
            date_to, date_from
        )));
    }
    Ok(())
}

/// Comments, reviews and chat messages can't be blank.
pub fn validate_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}
