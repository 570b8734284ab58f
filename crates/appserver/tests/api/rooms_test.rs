use axum::http::{Method, StatusCode};
use httpmock::Method::{GET, PATCH, POST};
use serde_json::json;

use crate::helpers::{
    authenticated_as, comment_json, room_json, user_json, MockPushNotifier, TestAppBuilder,
};

#[tokio::test]
async fn test_owner_cannot_open_a_thread_on_own_room() {
    let test_app = TestAppBuilder::new(authenticated_as(8)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let comment = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms/5/comments");
            then.status(201).json_body(comment_json(4, 5, 8, None));
        })
        .await;

    let (status, body) = test_app
        .request(
            Method::POST,
            "/rooms/5/comments",
            Some(json!({"comment": "Best room in town"})),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can't comment your own room");
    comment.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_owner_answer_notifies_the_thread_author() {
    let mut notifier = MockPushNotifier::new();
    notifier
        .expect_get_push_token()
        .withf(|user_id| *user_id == 1)
        .times(1)
        .returning(|_| Ok(Some(String::from("device-1"))));
    notifier
        .expect_send()
        .withf(|token, _title, body| {
            token.to_string() == "device-1" && body.contains("Johnny Bravo answered")
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let test_app = TestAppBuilder::new(authenticated_as(8))
        .notifier(notifier)
        .build()
        .await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5/comments/3");
            then.status(200).json_body(comment_json(3, 5, 1, None));
        })
        .await;
    test_app
        .users
        .mock_async(|when, then| {
            when.method(GET).path("/users/8");
            then.status(200).json_body(user_json(8, "Johnny", "Bravo"));
        })
        .await;
    let answer = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms/5/comments").json_body(json!({
                "comment": "Two blocks away",
                "main_comment_id": 3,
                "commentator": "Johnny Bravo",
                "commentator_id": 8,
            }));
            then.status(201).json_body(comment_json(4, 5, 8, Some(3)));
        })
        .await;

    let (status, body) = test_app
        .request(
            Method::POST,
            "/rooms/5/comments",
            Some(json!({"comment": "Two blocks away", "main_comment_id": 3})),
        )
        .await;
    test_app.notifications_flushed().await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["main_comment_id"], 3);
    assert_eq!(body["commentator_id"], 8);
    answer.assert_async().await;
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    let room = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;

    let (status, _) = test_app
        .request(
            Method::POST,
            "/rooms/5/comments",
            Some(json!({"comment": "   "})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    room.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_price_update_is_mirrored_in_payments() {
    let test_app = TestAppBuilder::new(authenticated_as(8)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let listing_update = test_app
        .listing
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rooms/5")
                .json_body(json!({"price_per_day": 80}));
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let payments_update = test_app
        .payments
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rooms/5")
                .json_body(json!({"price": 80}));
            then.status(200).json_body(json!({"id": 5, "price": 80}));
        })
        .await;

    let (status, body) = test_app
        .request(Method::PATCH, "/rooms/5", Some(json!({"price_per_day": 80})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 5);
    listing_update.assert_async().await;
    payments_update.assert_async().await;
}

#[tokio::test]
async fn test_no_favorites_skip_the_listing_service() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    test_app
        .users
        .mock_async(|when, then| {
            when.method(GET).path("/users/1/favorite_rooms");
            then.status(200).json_body(json!({"favorites": []}));
        })
        .await;
    let rooms = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms");
            then.status(200).json_body(json!({"amount": 0, "rooms": []}));
        })
        .await;

    let (status, body) = test_app
        .request(Method::GET, "/me/favorite_rooms", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"amount": 0, "rooms": []}));
    rooms.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_favorites_are_resolved_by_id() {
    let test_app = TestAppBuilder::new(authenticated_as(1)).build().await;

    test_app
        .users
        .mock_async(|when, then| {
            when.method(GET).path("/users/1/favorite_rooms");
            then.status(200).json_body(json!({
                "favorites": [
                    {"id": 1, "room_id": 5, "userId": 1},
                    {"id": 2, "room_id": 6, "userId": 1},
                ]
            }));
        })
        .await;
    let rooms = test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rooms")
                .query_param("ids", "5")
                .query_param("ids", "6");
            then.status(200).json_body(json!({
                "amount": 2,
                "rooms": [room_json(5, 8, false), room_json(6, 8, false)],
            }));
        })
        .await;

    let (status, body) = test_app
        .request(Method::GET, "/me/favorite_rooms", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount"], 2);
    rooms.assert_async().await;
}

#[tokio::test]
async fn test_owner_cannot_rate_own_room() {
    let test_app = TestAppBuilder::new(authenticated_as(8)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let rating = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms/5/ratings");
            then.status(201);
        })
        .await;

    let (status, body) = test_app
        .request(Method::POST, "/rooms/5/ratings", Some(json!({"rating": 5})))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can't rate your own room");
    rating.assert_calls_async(0).await;
}

#[tokio::test]
async fn test_owner_cannot_review_own_room() {
    let test_app = TestAppBuilder::new(authenticated_as(8)).build().await;

    test_app
        .listing
        .mock_async(|when, then| {
            when.method(GET).path("/rooms/5");
            then.status(200).json_body(room_json(5, 8, false));
        })
        .await;
    let review = test_app
        .listing
        .mock_async(|when, then| {
            when.method(POST).path("/rooms/5/reviews");
            then.status(201);
        })
        .await;

    let (status, body) = test_app
        .request(
            Method::POST,
            "/rooms/5/reviews",
            Some(json!({"review": "Lovely place"})),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can't review your own room");
    review.assert_calls_async(0).await;
}
