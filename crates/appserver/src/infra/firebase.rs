use reqwest_middleware::{
    reqwest::{self, Method, StatusCode},
    ClientWithMiddleware,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::FirebaseSettings;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),
    #[error("problem sending request to firebase: {0}")]
    Send(#[from] reqwest_middleware::Error),
    #[error("problem reading firebase response: {0}")]
    Read(#[from] reqwest::Error),
    #[error("firebase answered {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("invalid firebase url: {0}")]
    Url(String),
    #[error("unexpected firebase payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fails with [`Error::Status`] unless the response is a success.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status { status, body })
}

#[derive(Deserialize)]
struct PushedKey {
    name: String,
}

/// REST access to the realtime database, every path maps to `<path>.json`.
#[derive(Clone)]
pub struct RealtimeDatabase {
    client: ClientWithMiddleware,
    base_url: String,
    secret: SecretString,
}

impl RealtimeDatabase {
    pub fn new(client: ClientWithMiddleware, settings: &FirebaseSettings) -> Self {
        Self {
            client,
            base_url: settings.database_url.trim_end_matches('/').to_string(),
            secret: SecretString::from(settings.database_secret.clone()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, Error> {
        let mut request = self
            .client
            .request(method, self.url(path))
            .query(&[("auth", self.secret.expose_secret())]);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<Value>().await?)
    }

    /// `None` when nothing is stored at the path.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        let value = self.request(Method::GET, path, None).await?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<(), Error> {
        self.request(Method::PUT, path, Some(serde_json::to_value(value)?))
            .await?;
        Ok(())
    }

    /// Appends under a generated, chronologically ordered key and returns that key.
    pub async fn push<T: Serialize + ?Sized>(&self, path: &str, value: &T) -> Result<String, Error> {
        let pushed = self
            .request(Method::POST, path, Some(serde_json::to_value(value)?))
            .await?;
        let key: PushedKey = serde_json::from_value(pushed)?;
        Ok(key.name)
    }

    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        self.request(Method::DELETE, path, None).await?;
        Ok(())
    }
}
