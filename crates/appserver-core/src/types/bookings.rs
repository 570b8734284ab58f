use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Booking request sent by clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingSchema {
    pub room_id: i64,
    #[serde(with = "iso_date")]
    pub date_from: Date,
    #[serde(with = "iso_date")]
    pub date_to: Date,
}

/// Booking intent understood by the payment service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBookingIntent {
    pub room_id: i64,
    pub booker_id: i64,
    #[serde(with = "iso_date")]
    pub date_from: Date,
    #[serde(with = "iso_date")]
    pub date_to: Date,
}

impl PaymentBookingIntent {
    pub fn new(schema: &BookingSchema, booker_id: i64) -> Self {
        Self {
            room_id: schema.room_id,
            booker_id,
            date_from: schema.date_from,
            date_to: schema.date_to,
        }
    }
}

/// Booking as exposed by the gateway, built from the payment-service record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: i64,
    pub price: i64,
    pub room_id: i64,
    pub booker_id: i64,
    pub room_owner_id: i64,
    #[serde(with = "iso_date")]
    pub date_from: Date,
    #[serde(with = "iso_date")]
    pub date_to: Date,
    pub booking_status: i64,
    pub transaction_hash: Option<String>,
    pub transaction_status: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingList {
    pub amount: usize,
    pub bookings: Vec<Booking>,
}

impl From<Vec<Booking>> for BookingList {
    fn from(bookings: Vec<Booking>) -> Self {
        Self {
            amount: bookings.len(),
            bookings,
        }
    }
}

/// Bookings of a user split by role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingsUserList {
    pub made: BookingList,
    pub received: BookingList,
}

/// Copy of a booking kept by the listing service to compute room availability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomBookingRecord {
    pub id: i64,
    #[serde(with = "iso_date")]
    pub date_from: Date,
    #[serde(with = "iso_date")]
    pub date_to: Date,
}

impl From<&Booking> for RoomBookingRecord {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            date_from: booking.date_from,
            date_to: booking.date_to,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingStatusUpdate {
    pub booking_status: i64,
}
