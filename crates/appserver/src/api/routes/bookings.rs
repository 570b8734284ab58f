use appserver_core::{Booking, BookingFilter, BookingList, BookingSchema};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{ErrorResponse, IntoResponse},
    Json,
};
use log::error;
use std::sync::Arc;

use crate::{api::extractors::Caller, startup::AppState};

pub async fn create_booking(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BookingSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .bookings
        .create(caller.id, body)
        .await
        .map(|booking| (StatusCode::CREATED, Json(booking)))
        .map_err(|e| {
            error!("error creating booking: {:?}", e);
            e.into()
        })
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<BookingFilter>,
) -> Result<Json<BookingList>, ErrorResponse> {
    state.bookings.list(&filter).await.map(Json).map_err(|e| {
        error!("error listing bookings: {:?}", e);
        e.into()
    })
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, ErrorResponse> {
    state.bookings.get(booking_id).await.map(Json).map_err(|e| {
        error!("error getting booking {}: {:?}", booking_id, e);
        e.into()
    })
}

pub async fn accept_booking(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, ErrorResponse> {
    state
        .bookings
        .accept(caller.id, booking_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error accepting booking {}: {:?}", booking_id, e);
            e.into()
        })
}

pub async fn reject_booking(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, ErrorResponse> {
    state
        .bookings
        .reject(caller.id, booking_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error rejecting booking {}: {:?}", booking_id, e);
            e.into()
        })
}

pub async fn delete_booking(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, ErrorResponse> {
    state
        .bookings
        .delete(caller.id, booking_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting booking {}: {:?}", booking_id, e);
            e.into()
        })
}
