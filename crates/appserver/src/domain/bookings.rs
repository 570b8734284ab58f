use appserver_core::{
    can_book, can_modify, payment_camel_to_snake, payment_list_camel_to_snake,
    validate_booking_dates, Booking, BookingFilter, BookingList, BookingSchema,
    BookingStatusUpdate, PaymentBookingIntent, RoomBookingRecord,
};
use log::{info, warn};
use reqwest_middleware::reqwest::StatusCode;
use std::sync::Arc;

use super::{Backends, Error};
use crate::infra::{downstream::ServiceCall, notifier::Notification};

/// Bookings live in the payment service, the listing service keeps a copy per room.
pub struct Bookings {
    backends: Arc<Backends>,
}

impl Bookings {
    pub fn new(backends: Arc<Backends>) -> Self {
        Self { backends }
    }

    /// Books a room for the caller.
    ///
    /// The payment service assigns the booking id and initial status, the listing
    /// copy is written afterwards. A failed listing write leaves the payment booking
    /// in place and is reported to the caller.
    pub async fn create(&self, caller_id: i64, schema: BookingSchema) -> Result<Booking, Error> {
        validate_booking_dates(schema.date_from, schema.date_to)?;

        let room = self.backends.room(schema.room_id).await?;
        if room.blocked {
            return Err(Error::Forbidden(format!(
                "The room {} is blocked and can't be booked",
                room.id
            )));
        }
        if !can_book(room.owner_uuid, caller_id) {
            return Err(Error::Forbidden(String::from("You can't book your own room")));
        }

        let (body, _) = self
            .backends
            .payments
            .call(ServiceCall::post("/bookings").json(&PaymentBookingIntent::new(&schema, caller_id)))
            .await?;
        let booking = payment_camel_to_snake(&body)?;
        info!(
            "booking {} created for room {} by user {}",
            booking.id, booking.room_id, caller_id
        );

        self.backends
            .listing
            .call(
                ServiceCall::post(format!("/rooms/{}/bookings", room.id))
                    .json(&RoomBookingRecord::from(&booking)),
            )
            .await
            .map_err(|e| {
                warn!(
                    "booking {} exists in the payment service but not in the listing service",
                    booking.id
                );
                e
            })?;

        let room_title = room.title.clone();
        self.backends
            .notify_from(caller_id, room.owner_uuid, |sender| {
                Notification::NewBooking { sender, room_title }
            })
            .await;

        Ok(booking)
    }

    pub async fn get(&self, booking_id: i64) -> Result<Booking, Error> {
        let (body, _) = self
            .backends
            .payments
            .call(ServiceCall::get(format!("/bookings/{}", booking_id)))
            .await?;
        Ok(payment_camel_to_snake(&body)?)
    }

    pub async fn list(&self, filter: &BookingFilter) -> Result<BookingList, Error> {
        let (body, _) = self
            .backends
            .payments
            .call(ServiceCall::get("/bookings").query(filter.query_pairs()))
            .await?;
        Ok(payment_list_camel_to_snake(&body)?.into())
    }

    /// Confirms a pending booking, only the room owner can.
    pub async fn accept(&self, caller_id: i64, booking_id: i64) -> Result<Booking, Error> {
        let booking = self.owned_booking(caller_id, booking_id, "accept").await?;

        let (body, _) = self
            .backends
            .payments
            .call(
                ServiceCall::post(format!("/bookings/{}/accept", booking.id))
                    .expect(&[StatusCode::OK]),
            )
            .await?;
        let accepted = payment_camel_to_snake(&body)?;

        self.backends
            .listing
            .call(
                ServiceCall::patch(format!(
                    "/rooms/{}/bookings/{}",
                    accepted.room_id, accepted.id
                ))
                .json(&BookingStatusUpdate {
                    booking_status: accepted.booking_status,
                }),
            )
            .await?;

        self.notify_guest(caller_id, &accepted, |sender, room_title| {
            Notification::BookingAccepted { sender, room_title }
        })
        .await;

        Ok(accepted)
    }

    /// Rejects a pending booking, only the room owner can.
    ///
    /// The listing copy is removed so the dates become available again.
    pub async fn reject(&self, caller_id: i64, booking_id: i64) -> Result<Booking, Error> {
        let booking = self.owned_booking(caller_id, booking_id, "reject").await?;

        let (body, _) = self
            .backends
            .payments
            .call(
                ServiceCall::post(format!("/bookings/{}/reject", booking.id))
                    .expect(&[StatusCode::OK]),
            )
            .await?;
        let rejected = payment_camel_to_snake(&body)?;

        self.backends
            .listing
            .call(ServiceCall::delete(format!(
                "/rooms/{}/bookings/{}",
                rejected.room_id, rejected.id
            )))
            .await?;

        self.notify_guest(caller_id, &rejected, |sender, room_title| {
            Notification::BookingRejected { sender, room_title }
        })
        .await;

        Ok(rejected)
    }

    /// Cancels a booking, only the guest who made it can.
    pub async fn delete(&self, caller_id: i64, booking_id: i64) -> Result<Booking, Error> {
        let booking = self.get(booking_id).await?;
        if !can_modify(caller_id, booking.booker_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the booking of another user",
            )));
        }

        let (body, _) = self
            .backends
            .payments
            .call(ServiceCall::delete(format!("/bookings/{}", booking.id)))
            .await?;
        let deleted = payment_camel_to_snake(&body)?;

        self.backends
            .listing
            .call(ServiceCall::delete(format!(
                "/rooms/{}/bookings/{}",
                booking.room_id, booking.id
            )))
            .await?;

        Ok(deleted)
    }

    /// The booking is already settled, so a room that can't be resolved only
    /// drops the notification.
    async fn notify_guest<F>(&self, caller_id: i64, booking: &Booking, notification: F)
    where
        F: FnOnce(String, String) -> Notification,
    {
        match self.backends.room(booking.room_id).await {
            Ok(room) => {
                self.backends
                    .notify_from(caller_id, booking.booker_id, |sender| {
                        notification(sender, room.title)
                    })
                    .await
            }
            Err(e) => warn!(
                "skipping notification to {}, room {} not resolved: {}",
                booking.booker_id, booking.room_id, e
            ),
        }
    }

    async fn owned_booking(
        &self,
        caller_id: i64,
        booking_id: i64,
        action: &str,
    ) -> Result<Booking, Error> {
        let booking = self.get(booking_id).await?;
        if !can_modify(caller_id, booking.room_owner_id) {
            return Err(Error::Forbidden(format!(
                "You can't {} a booking of another user's room",
                action
            )));
        }
        Ok(booking)
    }
}
