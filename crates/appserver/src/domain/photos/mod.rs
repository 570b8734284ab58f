mod store;

pub use store::*;

use appserver_core::{can_modify, NewRoomPhoto, RoomPhoto, RoomPhotoList, User, UserUpdate};
use log::{info, warn};
use std::sync::Arc;

use super::{Backends, Error};
use crate::infra::{
    downstream::ServiceCall,
    storage::{profile_photo_path, room_photo_path, PhotoStorage},
};

/// File received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Room photos and profile pictures.
///
/// Room photo blobs are stored under a generated id, the link between that id and
/// the listing-service photo record is kept locally.
pub struct Photos {
    backends: Arc<Backends>,
    storage: Arc<dyn PhotoStorage>,
    links: PhotoLinkStore,
    ids: PhotoIdGenerator,
}

impl Photos {
    pub fn new(
        backends: Arc<Backends>,
        storage: Arc<dyn PhotoStorage>,
        links: PhotoLinkStore,
        ids: PhotoIdGenerator,
    ) -> Self {
        Self {
            backends,
            storage,
            links,
            ids,
        }
    }

    pub async fn ping(&self) -> Result<(), Error> {
        Ok(self.links.ping().await?)
    }

    pub async fn upload(&self, caller_id: i64, room_id: i64, upload: Upload) -> Result<RoomPhoto, Error> {
        let room = self.backends.room(room_id).await?;
        if !can_modify(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from(
                "You can't add photos to another user's room",
            )));
        }

        let firebase_id = self.ids.next_id();
        let url = self
            .storage
            .upload(
                &room_photo_path(room_id, firebase_id),
                upload.bytes,
                &upload.content_type,
            )
            .await?;

        let photo: RoomPhoto = self
            .backends
            .listing
            .fetch(
                ServiceCall::post(format!("/rooms/{}/photos", room_id))
                    .json(&NewRoomPhoto { url, firebase_id }),
            )
            .await?;

        self.links
            .add_link(firebase_id, photo.id)
            .await
            .map_err(|e| {
                warn!(
                    "photo {} registered in the listing service but not linked: {}",
                    photo.id, e
                );
                e
            })?;

        info!("photo {} added to room {}", firebase_id, room_id);
        Ok(photo)
    }

    pub async fn list(&self, room_id: i64) -> Result<RoomPhotoList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!("/rooms/{}/photos", room_id)))
            .await?)
    }

    pub async fn get(&self, room_id: i64, firebase_id: i64) -> Result<RoomPhoto, Error> {
        let link = self
            .links
            .get_link(firebase_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("photo {}", firebase_id)))?;

        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!(
                "/rooms/{}/photos/{}",
                room_id, link.room_photo_id
            )))
            .await?)
    }

    /// Removes a room photo: listing record first, then the link row, then the blob.
    ///
    /// The photo must belong to the room in the path, checked against the listing
    /// service before anything is written.
    pub async fn delete(&self, caller_id: i64, room_id: i64, firebase_id: i64) -> Result<RoomPhoto, Error> {
        let room = self.backends.room(room_id).await?;
        if !can_modify(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from(
                "You can't delete photos of another user's room",
            )));
        }
        let link = self
            .links
            .get_link(firebase_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("photo {}", firebase_id)))?;

        let photo: RoomPhoto = self
            .backends
            .listing
            .fetch(ServiceCall::get(format!(
                "/rooms/{}/photos/{}",
                room_id, link.room_photo_id
            )))
            .await?;
        if photo.room_id != room_id {
            return Err(Error::NotFound(format!("photo {}", firebase_id)));
        }

        let deleted: RoomPhoto = self
            .backends
            .listing
            .fetch(ServiceCall::delete(format!(
                "/rooms/{}/photos/{}",
                room_id, link.room_photo_id
            )))
            .await?;
        self.links.delete_link(firebase_id).await?;

        if let Err(e) = self
            .storage
            .remove(&room_photo_path(room_id, firebase_id))
            .await
        {
            warn!("photo {} deleted but its blob was kept: {}", firebase_id, e);
        }

        info!("photo {} removed from room {}", firebase_id, room_id);
        Ok(deleted)
    }

    /// Stores a new profile picture and points the user's profile at it.
    pub async fn update_profile_picture(
        &self,
        caller_id: i64,
        user_id: i64,
        upload: Upload,
    ) -> Result<User, Error> {
        if !can_modify(caller_id, user_id) {
            return Err(Error::Forbidden(String::from(
                "You can't modify the photo of another user",
            )));
        }

        let url = self
            .storage
            .upload(
                &profile_photo_path(user_id, upload.file_name.as_deref()),
                upload.bytes,
                &upload.content_type,
            )
            .await?;

        Ok(self
            .backends
            .users
            .fetch(
                ServiceCall::patch(format!("/users/{}", user_id)).json(&UserUpdate {
                    photo: Some(url),
                    ..Default::default()
                }),
            )
            .await?)
    }
}
