use axum::http::{Method, StatusCode};
use httpmock::Method::{DELETE, GET, POST};
use serde_json::json;

use crate::helpers::{
    authenticated_as, payment_booking_json, room_json, MockAuthService, TestAppBuilder,
};

#[tokio::test]
async fn test_missing_token_is_rejected_without_downstream_calls() {
    let mut auth = MockAuthService::new();
    auth.expect_token_is_valid().never();
    auth.expect_resolve_identity().never();
    let test_app = TestAppBuilder::new(auth).build().await;

    let create = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms");
            then.status(201).json_body(room_json(5, 8, false));
        })
        .await;

    let (status, body) = test_app
        .send(
            Method::POST,
            "/rooms",
            None,
            Some(json!({
                "title": "Beach house",
                "description": "Two blocks from the sea",
                "type": "House",
                "capacity": 4,
                "latitude": -34.6,
                "longitude": -58.4,
                "location": "Mar del Plata",
                "price_per_day": 5,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing access token"}));
    create.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_blank_token_counts_as_missing() {
    let mut auth = MockAuthService::new();
    auth.expect_token_is_valid().never();
    let test_app = TestAppBuilder::new(auth).build().await;

    let (status, _) = test_app
        .send(Method::GET, "/me", Some("   "), None)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let mut auth = MockAuthService::new();
    auth.expect_token_is_valid()
        .withf(|token| token.to_string() == "expired-token")
        .times(1)
        .returning(|_| Ok(false));
    auth.expect_resolve_identity().never();
    let test_app = TestAppBuilder::new(auth).build().await;

    let room = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;

    let (status, body) = test_app
        .send(Method::DELETE, "/rooms/5", Some("expired-token"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"error": "Invalid access token"}));
    room.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_health_check_needs_no_token() {
    let mut auth = MockAuthService::new();
    auth.expect_token_is_valid().never();
    let test_app = TestAppBuilder::new(auth).build().await;

    let (status, _) = test_app
        .send(Method::GET, "/health_check", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_deleting_another_users_room_is_forbidden() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let listing_delete = test_app
        .listing
        .mock_async(|when, then| {
            when.method(DELETE).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let payments_delete = test_app
        .payments
        .mock_async(|when, then| {
            when.method(DELETE).path("/rooms/5");
            then.status(200);
        })
        .await;

    let (status, body) = test_app.request(Method::DELETE, "/rooms/5", None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can't delete another user's room");
    listing_delete.assert_calls_async(0).await;
    payments_delete.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_downstream_errors_are_passed_through() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/99");
            then.status(404)
                .json_body(json!({"detail": "Room 99 not found"}));
        })
        .await;

    let (status, body) = test_app.request(Method::GET, "/rooms/99", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Room 99 not found"}));
}

#[tokio::test]
async fn test_listing_requests_carry_the_api_key() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    let rooms = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rooms")
                .header("api_key", "test-key")
                .query_param("type", "Apartment");
            then.status(200).json_body(json!({"amount": 0, "rooms": []}));
        })
        .await;

    let (status, body) = test_app
        .request(Method::GET, "/rooms?type=Apartment", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"amount": 0, "rooms": []}));
    rooms.assert_async().await;
}

#[tokio::test]
async fn test_public_reads_need_no_token() {
    let mut auth = MockAuthService::new();
    auth.expect_token_is_valid().never();
    auth.expect_resolve_identity().never();
    let test_app = TestAppBuilder::new(auth).build().await;

    test_app
        .payments
        .mock_async(|when, then| {
            when.method(GET).path("/bookings/4");
            then.status(200).json_body(payment_booking_json(4, 5, 1, 8, 0));
        })
        .await;
    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;

    let (status, body) = test_app.send(Method::GET, "/bookings/4", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 4);

    let (status, body) = test_app.send(Method::GET, "/rooms/5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 5);
}
