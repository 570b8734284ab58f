//! Shape translation between downstream payloads and the gateway schema.

use serde_json::{Map, Value};

use crate::{Booking, CoreError};

/// Payment-service booking fields and their gateway names.
const PAYMENT_BOOKING_FIELDS: [(&str, &str); 12] = [
    ("id", "id"),
    ("price", "price"),
    ("roomId", "room_id"),
    ("bookerId", "booker_id"),
    ("roomOwnerId", "room_owner_id"),
    ("dateFrom", "date_from"),
    ("dateTo", "date_to"),
    ("bookingStatus", "booking_status"),
    ("transactionHash", "transaction_hash"),
    ("transactionStatus", "transaction_status"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

/// Renames a camelCase payment-service booking into the snake_case gateway booking.
///
/// Every field is required, a payload missing any of them fails with
/// [`CoreError::MissingField`] instead of being defaulted.
pub fn payment_camel_to_snake(payload: &Value) -> Result<Booking, CoreError> {
    let source = payload.as_object().ok_or_else(|| {
        CoreError::Shape(format!("expected a booking object, got: {}", payload))
    })?;

    let mut renamed = Map::with_capacity(PAYMENT_BOOKING_FIELDS.len());
    for (camel, snake) in PAYMENT_BOOKING_FIELDS {
        let value = source
            .get(camel)
            .ok_or_else(|| CoreError::MissingField(camel.to_string()))?;
        renamed.insert(snake.to_string(), value.clone());
    }

    Ok(serde_json::from_value(Value::Object(renamed))?)
}

/// Translates a list of payment-service bookings, failing on the first malformed entry.
pub fn payment_list_camel_to_snake(payload: &Value) -> Result<Vec<Booking>, CoreError> {
    payload
        .as_array()
        .ok_or_else(|| CoreError::Shape(format!("expected a list of bookings, got: {}", payload)))?
        .iter()
        .map(payment_camel_to_snake)
        .collect()
}

/// Human readable message of a failed downstream response.
///
/// Looks at `detail` then `error`, falling back to the whole body.
pub fn extract_error_message(body: &Value) -> String {
    ["detail", "error"]
        .iter()
        .find_map(|field| body.get(field))
        .map(|message| match message {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| match body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
}
