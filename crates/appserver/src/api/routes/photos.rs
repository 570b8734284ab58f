use appserver_core::{RoomPhoto, RoomPhotoList, User};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{ErrorResponse, IntoResponse},
    Json,
};
use log::{debug, error};
use std::sync::Arc;

use crate::{
    api::extractors::Caller,
    domain::{Error, Upload},
    startup::AppState,
};

const FILE_FIELD: &str = "file";

/// Reads the `file` part of a multipart form.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::BadRequest(e.body_text()))?;
        if bytes.is_empty() {
            return Err(Error::BadRequest(String::from("The uploaded file is empty")));
        }
        debug!("received {} ({} bytes)", content_type, bytes.len());

        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(Error::BadRequest(format!("Missing `{}` field", FILE_FIELD)))
}

pub async fn upload_room_photo(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ErrorResponse> {
    let upload = read_upload(multipart).await?;
    state
        .photos
        .upload(caller.id, room_id, upload)
        .await
        .map(|photo| (StatusCode::CREATED, Json(photo)))
        .map_err(|e| {
            error!("error uploading photo to room {}: {:?}", room_id, e);
            e.into()
        })
}

pub async fn get_room_photos(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomPhotoList>, ErrorResponse> {
    state.photos.list(room_id).await.map(Json).map_err(|e| {
        error!("error listing photos of room {}: {:?}", room_id, e);
        e.into()
    })
}

pub async fn get_room_photo(
    State(state): State<Arc<AppState>>,
    Path((room_id, firebase_id)): Path<(i64, i64)>,
) -> Result<Json<RoomPhoto>, ErrorResponse> {
    state
        .photos
        .get(room_id, firebase_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error getting photo {}: {:?}", firebase_id, e);
            e.into()
        })
}

pub async fn delete_room_photo(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path((room_id, firebase_id)): Path<(i64, i64)>,
) -> Result<Json<RoomPhoto>, ErrorResponse> {
    state
        .photos
        .delete(caller.id, room_id, firebase_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error deleting photo {}: {:?}", firebase_id, e);
            e.into()
        })
}

pub async fn update_user_photo(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<User>, ErrorResponse> {
    let upload = read_upload(multipart).await?;
    state
        .photos
        .update_profile_picture(caller.id, user_id, upload)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error updating photo of user {}: {:?}", user_id, e);
            e.into()
        })
}

pub async fn update_profile_picture(
    caller: Caller,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<User>, ErrorResponse> {
    let upload = read_upload(multipart).await?;
    state
        .photos
        .update_profile_picture(caller.id, caller.id, upload)
        .await
        .map(Json)
        .map_err(|e| {
            error!("error updating profile picture of {}: {:?}", caller.id, e);
            e.into()
        })
}
