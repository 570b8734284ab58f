use appserver_core::{FeedbackRole, User, UserList, UserRatingSchema, UserReviewSchema, UserSchema, UserUpdate};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{ErrorResponse, IntoResponse, Response},
    Json,
};
use log::error;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    api::extractors::{AccessToken, Caller},
    domain::Error,
    startup::AppState,
};

/// Feedback collections kept for every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserFeedback {
    HostRatings,
    GuestRatings,
    HostReviews,
    GuestReviews,
}

impl UserFeedback {
    fn role(self) -> FeedbackRole {
        match self {
            Self::HostRatings | Self::HostReviews => FeedbackRole::Host,
            Self::GuestRatings | Self::GuestReviews => FeedbackRole::Guest,
        }
    }

    fn is_rating(self) -> bool {
        matches!(self, Self::HostRatings | Self::GuestRatings)
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, Error> {
    serde_json::from_value(body).map_err(|e| Error::BadRequest(e.to_string()))
}

pub async fn create_user(
    AccessToken(token): AccessToken,
    State(state): State<Arc<AppState>>,
    Json(body): Json<UserSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .users
        .create(&token, body)
        .await
        .map(|user| (StatusCode::CREATED, Json(user)))
        .map_err(|e| {
            error!("error registering user: {:?}", e);
            e.into()
        })
}

pub async fn get_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserList>, ErrorResponse> {
    state.users.list().await.map(Json).map_err(|e| {
        error!("error listing users: {:?}", e);
        e.into()
    })
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ErrorResponse> {
    state.users.get(user_id).await.map(Json).map_err(|e| {
        error!("error getting user {}: {:?}", user_id, e);
        e.into()
    })
}

pub async fn update_user(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<User>, ErrorResponse> {
    state
        .users
        .update(caller.id, user_id, body)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error updating user {}: {:?}", user_id, e);
            e.into()
        })
}

pub async fn delete_user(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ErrorResponse> {
    state
        .users
        .delete(caller.id, user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting user {}: {:?}", user_id, e);
            e.into()
        })
}

pub async fn add_user_feedback(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((user_id, feedback)): Path<(i64, UserFeedback)>,
    Json(body): Json<Value>,
) -> Result<Response, ErrorResponse> {
    let role = feedback.role();
    let result = if feedback.is_rating() {
        match decode::<UserRatingSchema>(body) {
            Ok(schema) => state
                .users
                .rate(caller.id, user_id, role, schema)
                .await
                .map(|rating| (StatusCode::CREATED, Json(rating)).into_response()),
            Err(e) => Err(e),
        }
    } else {
        match decode::<UserReviewSchema>(body) {
            Ok(schema) => state
                .users
                .review(caller.id, user_id, role, schema)
                .await
                .map(|review| (StatusCode::CREATED, Json(review)).into_response()),
            Err(e) => Err(e),
        }
    };

    result.map_err(|e| {
        error!("error adding {} feedback to user {}: {:?}", role, user_id, e);
        e.into()
    })
}

pub async fn get_user_feedback(
    State(state): State<Arc<AppState>>,
    Path((user_id, feedback)): Path<(i64, UserFeedback)>,
) -> Result<Response, ErrorResponse> {
    let role = feedback.role();
    let result = if feedback.is_rating() {
        state
            .users
            .ratings(user_id, role)
            .await
            .map(|ratings| Json(ratings).into_response())
    } else {
        state
            .users
            .reviews(user_id, role)
            .await
            .map(|reviews| Json(reviews).into_response())
    };

    result.map_err(|e| {
        error!("error listing {} feedback of user {}: {:?}", role, user_id, e);
        e.into()
    })
}

pub async fn get_user_feedback_entry(
    State(state): State<Arc<AppState>>,
    Path((user_id, feedback, entry_id)): Path<(i64, UserFeedback, i64)>,
) -> Result<Response, ErrorResponse> {
    let role = feedback.role();
    let result = if feedback.is_rating() {
        state
            .users
            .rating(user_id, role, entry_id)
            .await
            .map(|rating| Json(rating).into_response())
    } else {
        state
            .users
            .get_review(user_id, role, entry_id)
            .await
            .map(|review| Json(review).into_response())
    };

    result.map_err(|e| {
        error!("error getting {} feedback {}: {:?}", role, entry_id, e);
        e.into()
    })
}

pub async fn delete_user_feedback_entry(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((user_id, feedback, entry_id)): Path<(i64, UserFeedback, i64)>,
) -> Result<Response, ErrorResponse> {
    let role = feedback.role();
    let result = if feedback.is_rating() {
        state
            .users
            .delete_rating(caller.id, user_id, role, entry_id)
            .await
            .map(|rating| Json(rating).into_response())
    } else {
        state
            .users
            .delete_review(caller.id, user_id, role, entry_id)
            .await
            .map(|review| Json(review).into_response())
    };

    result.map_err(|e| {
        error!("error deleting {} feedback {}: {:?}", role, entry_id, e);
        e.into()
    })
}
