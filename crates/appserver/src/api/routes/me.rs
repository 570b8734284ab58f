use appserver_core::{
    BookingsUserList, ChatList, ChatMessages, FavoriteRoomSchema, MessageSchema, PushToken,
    PushTokenSchema, Room, RoomList, User, Wallet,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{ErrorResponse, IntoResponse},
    Json,
};
use log::error;
use std::sync::Arc;

use crate::{api::extractors::Caller, startup::AppState};

pub async fn get_me(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<User>, ErrorResponse> {
    state.me.profile(caller.id).await.map(Json).map_err(|e| {
        error!("error getting profile of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn get_my_wallet(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Wallet>, ErrorResponse> {
    state.me.wallet(caller.id).await.map(Json).map_err(|e| {
        error!("error getting wallet of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn get_my_bookings(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<BookingsUserList>, ErrorResponse> {
    state.me.bookings(caller.id).await.map(Json).map_err(|e| {
        error!("error getting bookings of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn get_my_rooms(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomList>, ErrorResponse> {
    state.me.rooms(caller.id).await.map(Json).map_err(|e| {
        error!("error getting rooms of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn set_push_token(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PushTokenSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .me
        .set_push_token(caller.id, body.push_token)
        .await
        .map(|token| (StatusCode::CREATED, Json(token)))
        .map_err(|e| {
            error!("error registering push token of {}: {:?}", caller.id, e);
            e.into()
        })
}

pub async fn get_push_token(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PushToken>, ErrorResponse> {
    state.me.push_token(caller.id).await.map(Json).map_err(|e| {
        error!("error getting push token of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn delete_push_token(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PushToken>, ErrorResponse> {
    state
        .me
        .delete_push_token(caller.id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error removing push token of {}: {:?}", caller.id, e);
            e.into()
        })
}

pub async fn get_my_chats(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChatList>, ErrorResponse> {
    state.me.chats(caller.id).await.map(Json).map_err(|e| {
        error!("error listing chats of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn get_chat_messages(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(other_id): Path<i64>,
) -> Result<Json<ChatMessages>, ErrorResponse> {
    state
        .me
        .messages(caller.id, other_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting chat {} of {}: {:?}", other_id, caller.id, e);
            e.into()
        })
}

pub async fn send_chat_message(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(other_id): Path<i64>,
    Json(body): Json<MessageSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .me
        .send_message(caller.id, other_id, body)
        .await
        .map(|message| (StatusCode::CREATED, Json(message)))
        .map_err(|e| {
            error!("error sending message to {}: {:?}", other_id, e);
            e.into()
        })
}

pub async fn add_favorite_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Json(body): Json<FavoriteRoomSchema>,
) -> Result<impl IntoResponse, ErrorResponse> {
    state
        .me
        .add_favorite(caller.id, body)
        .await
        .map(|room| (StatusCode::CREATED, Json(room)))
        .map_err(|e| {
            error!("error adding favorite room for {}: {:?}", caller.id, e);
            e.into()
        })
}

pub async fn get_favorite_rooms(
    caller: Caller,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RoomList>, ErrorResponse> {
    state.me.favorites(caller.id).await.map(Json).map_err(|e| {
        error!("error listing favorite rooms of {}: {:?}", caller.id, e);
        e.into()
    })
}

pub async fn delete_favorite_room(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(favorite_id): Path<i64>,
) -> Result<Json<Room>, ErrorResponse> {
    state
        .me
        .delete_favorite(caller.id, favorite_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting favorite {}: {:?}", favorite_id, e);
            e.into()
        })
}
