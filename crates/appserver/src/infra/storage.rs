use async_trait::async_trait;
use log::{debug, info};
use reqwest_middleware::{
    reqwest::{header::CONTENT_TYPE, StatusCode, Url},
    ClientWithMiddleware,
};
use secrecy::{ExposeSecret, SecretString};

use super::firebase::{ensure_success, Error};
use crate::config::FirebaseSettings;

pub fn room_photo_path(room_id: i64, firebase_id: i64) -> String {
    format!("rooms/{}/{}", room_id, firebase_id)
}

/// Profile pictures keep the uploaded file's extension, `users/3/profile.png`.
pub fn profile_photo_path(user_id: i64, file_name: Option<&str>) -> String {
    let extension = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, extension)| format!(".{}", extension))
        .unwrap_or_default();
    format!("users/{}/profile{}", user_id, extension)
}

/// Blob storage for room and profile photos.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    /// Stores the bytes publicly and returns their url.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, Error>;
    /// Fails with [`Error::NotFound`] when nothing is stored at the path.
    async fn remove(&self, path: &str) -> Result<(), Error>;
}

/// Cloud storage bucket accessed through its JSON API.
#[derive(Clone)]
pub struct FirebaseStorage {
    client: ClientWithMiddleware,
    base_url: String,
    bucket: String,
    token: SecretString,
}

impl FirebaseStorage {
    pub fn new(client: ClientWithMiddleware, settings: &FirebaseSettings) -> Self {
        Self {
            client,
            base_url: settings.storage_url.trim_end_matches('/').to_string(),
            bucket: settings.storage_bucket.clone(),
            token: SecretString::from(settings.storage_token.clone()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.bucket, path)
    }

    fn object_url(&self, path: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Url(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", path]);
        Ok(url)
    }
}

#[async_trait]
impl PhotoStorage for FirebaseStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, Error> {
        let url = format!("{}/upload/storage/v1/b/{}/o", self.base_url, self.bucket);
        debug!("uploading {} bytes to {}", bytes.len(), path);

        let response = self
            .client
            .post(url)
            .query(&[
                ("uploadType", "media"),
                ("name", path),
                ("predefinedAcl", "publicRead"),
            ])
            .bearer_auth(self.token.expose_secret())
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await?;

        let public_url = self.public_url(path);
        info!("stored photo at {}", public_url);
        Ok(public_url)
    }

    async fn remove(&self, path: &str) -> Result<(), Error> {
        let response = self
            .client
            .delete(self.object_url(path)?)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("photo {}", path)));
        }
        ensure_success(response).await?;
        Ok(())
    }
}

/// Stand-in used when firebase is disabled, nothing is stored.
#[derive(Clone, Debug, Default)]
pub struct NoopStorage;

#[async_trait]
impl PhotoStorage for NoopStorage {
    async fn upload(&self, path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, Error> {
        Ok(format!("noop://{}", path))
    }

    async fn remove(&self, _path: &str) -> Result<(), Error> {
        Ok(())
    }
}
