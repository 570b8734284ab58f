use axum::http::{Method, StatusCode};
use httpmock::Method::{DELETE, GET, PATCH, POST};
use serde_json::json;

use crate::helpers::{
    authenticated_as, payment_booking_json, room_json, user_json, MockPushNotifier,
    TestAppBuilder,
};

fn booking_request() -> serde_json::Value {
    json!({
        "room_id": 5,
        "date_from": "2020-12-01",
        "date_to": "2020-12-03",
    })
}

#[tokio::test]
async fn test_booking_is_created_in_payments_and_mirrored_in_listing() {
    let mut notifier = MockPushNotifier::new();
    notifier
        .expect_get_push_token()
        .withf(|user_id| *user_id == 8)
        .times(1)
        .returning(|_| Ok(Some(String::from("device-8"))));
    notifier
        .expect_send()
        .withf(|token, _title, body| {
            token.to_string() == "device-8" && body.contains("Ana Lopez")
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let test_app = TestAppBuilder::new(authenticated_as(1))
        .notifier(notifier)
        .build()
        .await;

    let room = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let payment = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings").json_body(json!({
                "roomId": 5,
                "bookerId": 1,
                "dateFrom": "2020-12-01",
                "dateTo": "2020-12-03",
            }));
            then.status(201).json_body(payment_booking_json(10, 5, 1, 8, 0));
        })
        .await;
    let mirror = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms/5/bookings").json_body(json!({
                "id": 10,
                "date_from": "2020-12-01",
                "date_to": "2020-12-03",
            }));
            then.status(201).json_body(json!({"id": 10, "room_id": 5}));
        })
        .await;
    test_app
        .users
        .mock_async(|when, then| {
            when.method(GET).path("/users/1");
            then.status(200).json_body(user_json(1, "Ana", "Lopez"));
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/bookings", Some(booking_request()))
        .await;
    test_app.notifications_flushed().await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 10);
    assert_eq!(body["room_id"], 5);
    assert_eq!(body["booker_id"], 1);
    assert_eq!(body["room_owner_id"], 8);
    assert_eq!(body["booking_status"], 0);
    assert_eq!(body["date_from"], "2020-12-01");
    assert!(body.get("roomId").is_none());
    room.assert_async().await;
    payment.assert_async().await;
    mirror.assert_async().await;
}

#[tokio::test]
async fn test_owner_cannot_book_own_room() {
    let test_app = TestAppBuilder::new(authenticated_as(8)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let payment = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings");
            then.status(201).json_body(payment_booking_json(10, 5, 8, 8, 0));
        })
        .await;
    let mirror = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms/5/bookings");
            then.status(201);
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/bookings", Some(booking_request()))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "You can't book your own room"}));
    payment.assert_calls_async(0).await;
    mirror.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_blocked_room_cannot_be_booked() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, true));
        })
        .await;
    let payment = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings");
            then.status(201);
        })
        .await;

    let (status, _) = test_app
        .request(Method::POST, "/bookings", Some(booking_request()))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    payment.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_reversed_dates_are_rejected_before_any_call() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    let room = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;

    let (status, body) = test_app
        .request(
            Method::POST,
            "/bookings",
            Some(json!({
                "room_id": 5,
                "date_from": "2020-12-03",
                "date_to": "2020-12-01",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    room.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_only_room_owner_accepts_a_booking() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/10");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 0));
        })
        .await;
    let accept = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings/10/accept");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 1));
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/bookings/10/accept", None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "You can't accept a booking of another user's room"
    );
    accept.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_rejected_booking_leaves_the_listing() {
    let test_app = TestAppBuilder::new(authenticated_as(8)).build().await;

    test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/10");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 0));
        })
        .await;
    let reject = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings/10/reject");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 2));
        })
        .await;
    let mirror = test_app
        .listing
        .mock_async(|when, then| {
            when.method(DELETE).path("/rooms/5/bookings/10");
            then.status(200).json_body(json!({"id": 10}));
        })
        .await;
    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    test_app
        .users
        .mock_async(|when, then| {
            when.method(GET).path("/users/8");
            then.status(200).json_body(user_json(8, "Johnny", "Bravo"));
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/bookings/10/reject", None)
        .await;
    test_app.notifications_flushed().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking_status"], 2);
    reject.assert_async().await;
    mirror.assert_async().await;
}

#[tokio::test]
async fn test_malformed_payment_booking_is_an_internal_error() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    let mut booking = payment_booking_json(10, 5, 1, 8, 0);
    if let Some(fields) = booking.as_object_mut() {
        fields.remove("bookingStatus");
    }
    test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/10");
            then.status(200).json_body(booking);
        })
        .await;

    let (status, body) = test_app.request(Method::GET, "/bookings/10", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal server error"}));
}

#[tokio::test]
async fn test_my_bookings_are_split_by_role() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    let made = test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings").query_param("bookerId", "1");
            then.status(200)
                .json_body(json!([payment_booking_json(10, 5, 1, 8, 0)]));
        })
        .await;
    let received = test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings").query_param("roomOwnerId", "1");
            then.status(200).json_body(json!([]));
        })
        .await;

    let (status, body) = test_app.request(Method::GET, "/me/bookings", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["made"]["amount"], 1);
    assert_eq!(body["made"]["bookings"][0]["booker_id"], 1);
    assert_eq!(body["received"], json!({"amount": 0, "bookings": []}));
    made.assert_async().await;
    received.assert_async().await;
}

#[tokio::test]
async fn test_accepted_booking_is_mirrored_and_guest_notified() {
    let mut notifier = MockPushNotifier::new();
    notifier
        .expect_get_push_token()
        .withf(|user_id| *user_id == 3)
        .times(1)
        .returning(|_| Ok(Some(String::from("device-3"))));
    notifier
        .expect_send()
        .withf(|token, _title, body| {
            token.to_string() == "device-3"
                && body.contains("Johnny Bravo accepted your booking")
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let test_app = TestAppBuilder::new(authenticated_as(8))
        .notifier(notifier)
        .build()
        .await;

    test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/10");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 0));
        })
        .await;
    let accept = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings/10/accept");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 1));
        })
        .await;
    let mirror = test_app
        .listing
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rooms/5/bookings/10")
                .json_body(json!({"booking_status": 1}));
            then.status(200).json_body(json!({"id": 10, "booking_status": 1}));
        })
        .await;
    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    test_app
        .users
        .mock_async(|when, then| {
            when.method(GET).path("/users/8");
            then.status(200).json_body(user_json(8, "Johnny", "Bravo"));
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/bookings/10/accept", None)
        .await;
    test_app.notifications_flushed().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking_status"], 1);
    assert_eq!(body["booker_id"], 3);
    accept.assert_async().await;
    mirror.assert_async().await;
}

#[tokio::test]
async fn test_accept_succeeds_when_room_lookup_for_notification_fails() {
    let mut notifier = MockPushNotifier::new();
    notifier.expect_get_push_token().never();
    notifier.expect_send().never();
    let test_app = TestAppBuilder::new(authenticated_as(8))
        .notifier(notifier)
        .build()
        .await;

    test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/10");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 0));
        })
        .await;
    let accept = test_app
        .payments
        .mock_async(|when, then| {
            when.method(POST).path("/bookings/10/accept");
            then.status(200).json_body(payment_booking_json(10, 5, 3, 8, 1));
        })
        .await;
    let mirror = test_app
        .listing
        .mock_async(|when, then| {
            when.method(PATCH).path("/rooms/5/bookings/10");
            then.status(200).json_body(json!({"id": 10, "booking_status": 1}));
        })
        .await;
    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(503).json_body(json!({"detail": "listing busy"}));
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/bookings/10/accept", None)
        .await;
    test_app.notifications_flushed().await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booking_status"], 1);
    accept.assert_async().await;
    mirror.assert_async().await;
}
