use appserver_core::{
    Room, RoomComment, RoomCommentList, RoomCommentSchema, RoomFilter, RoomList, RoomRating,
    RoomRatingList, RoomRatingSchema, RoomRatingUpdate, RoomReview, RoomReviewList,
    RoomReviewSchema, RoomReviewUpdate, RoomSchema, RoomUpdate,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{ErrorResponse, IntoResponse},
    Json,
};
use log::error;
use std::sync::Arc;

use crate::{api::extractors::Caller, startup::AppState};

pub async fn create_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(body): Json<RoomSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .rooms
        .create(caller.id, body)
        .await
        .map(|room| (StatusCode::CREATED, Json(room)))
        .map_err(|e| {
            error!("error creating room: {:?}", e);
            e.into()
        })
}

pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RoomFilter>,
) -> Result<Json<RoomList>, ErrorResponse> {
    state.rooms.list(&filter).await.map(Json).map_err(|e| {
        error!("error listing rooms: {:?}", e);
        e.into()
    })
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<Room>, ErrorResponse> {
    state.rooms.get(room_id).await.map(Json).map_err(|e| {
        error!("error getting room {}: {:?}", room_id, e);
        e.into()
    })
}

pub async fn update_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    Json(body): Json<RoomUpdate>,
) -> Result<Json<Room>, ErrorResponse> {
    state
        .rooms
        .update(caller.id, room_id, body)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error updating room {}: {:?}", room_id, e);
            e.into()
        })
}

pub async fn delete_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<Room>, ErrorResponse> {
    state
        .rooms
        .delete(caller.id, room_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting room {}: {:?}", room_id, e);
            e.into()
        })
}

pub async fn get_recommendations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomList>, ErrorResponse> {
    state.rooms.recommendations().await.map(Json).map_err(|e| {
        error!("error getting recommendations: {:?}", e);
        e.into()
    })
}

pub async fn rate_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    Json(body): Json<RoomRatingSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .feedback
        .rate(caller.id, room_id, body)
        .await
        .map(|rating| (StatusCode::CREATED, Json(rating)))
        .map_err(|e| {
            error!("error rating room {}: {:?}", room_id, e);
            e.into()
        })
}

pub async fn get_room_ratings(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomRatingList>, ErrorResponse> {
    state.feedback.ratings(room_id).await.map(Json).map_err(|e| {
        error!("error listing ratings of room {}: {:?}", room_id, e);
        e.into()
    })
}

pub async fn get_room_rating(
    State(state): State<Arc<AppState>>,
    Path((room_id, rating_id)): Path<(i64, i64)>,
) -> Result<Json<RoomRating>, ErrorResponse> {
    state
        .feedback
        .rating(room_id, rating_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting rating {}: {:?}", rating_id, e);
            e.into()
        })
}

pub async fn update_room_rating(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((room_id, rating_id)): Path<(i64, i64)>,
    Json(body): Json<RoomRatingUpdate>,
) -> Result<Json<RoomRating>, ErrorResponse> {
    state
        .feedback
        .update_rating(caller.id, room_id, rating_id, body)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error updating rating {}: {:?}", rating_id, e);
            e.into()
        })
}

pub async fn delete_room_rating(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((room_id, rating_id)): Path<(i64, i64)>,
) -> Result<Json<RoomRating>, ErrorResponse> {
    state
        .feedback
        .delete_rating(caller.id, room_id, rating_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting rating {}: {:?}", rating_id, e);
            e.into()
        })
}

pub async fn review_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    Json(body): Json<RoomReviewSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .feedback
        .review(caller.id, room_id, body)
        .await
        .map(|review| (StatusCode::CREATED, Json(review)))
        .map_err(|e| {
            error!("error reviewing room {}: {:?}", room_id, e);
            e.into()
        })
}

pub async fn get_room_reviews(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomReviewList>, ErrorResponse> {
    state.feedback.reviews(room_id).await.map(Json).map_err(|e| {
        error!("error listing reviews of room {}: {:?}", room_id, e);
        e.into()
    })
}

pub async fn get_room_review(
    State(state): State<Arc<AppState>>,
    Path((room_id, review_id)): Path<(i64, i64)>,
) -> Result<Json<RoomReview>, ErrorResponse> {
    state
        .feedback
        .get_review(room_id, review_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting review {}: {:?}", review_id, e);
            e.into()
        })
}

pub async fn update_room_review(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((room_id, review_id)): Path<(i64, i64)>,
    Json(body): Json<RoomReviewUpdate>,
) -> Result<Json<RoomReview>, ErrorResponse> {
    state
        .feedback
        .update_review(caller.id, room_id, review_id, body)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error updating review {}: {:?}", review_id, e);
            e.into()
        })
}

pub async fn delete_room_review(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((room_id, review_id)): Path<(i64, i64)>,
) -> Result<Json<RoomReview>, ErrorResponse> {
    state
        .feedback
        .delete_review(caller.id, room_id, review_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting review {}: {:?}", review_id, e);
            e.into()
        })
}

pub async fn comment_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    Json(body): Json<RoomCommentSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .feedback
        .comment(caller.id, room_id, body)
        .await
        .map(|comment| (StatusCode::CREATED, Json(comment)))
        .map_err(|e| {
            error!("error commenting room {}: {:?}", room_id, e);
            e.into()
        })
}

pub async fn get_room_comments(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomCommentList>, ErrorResponse> {
    state.feedback.comments(room_id).await.map(Json).map_err(|e| {
        error!("error listing comments of room {}: {:?}", room_id, e);
        e.into()
    })
}

pub async fn get_room_comment(
    State(state): State<Arc<AppState>>,
    Path((room_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<RoomComment>, ErrorResponse> {
    state
        .feedback
        .get_comment(room_id, comment_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting comment {}: {:?}", comment_id, e);
            e.into()
        })
}

pub async fn delete_room_comment(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((room_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<RoomComment>, ErrorResponse> {
    state
        .feedback
        .delete_comment(caller.id, room_id, comment_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting comment {}: {:?}", comment_id, e);
            e.into()
        })
}
