use appserver_core::{Identity, Registration};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest_middleware::reqwest::StatusCode;
use thiserror::Error;

use super::downstream::{self, ServiceCall, ServiceClient};

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing access token")]
    MissingToken,
    #[error("Invalid access token")]
    InvalidToken,
    #[error(transparent)]
    Downstream(#[from] downstream::Error),
}

/// Exchanges caller tokens for identities against the auth service.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Whether the auth service currently accepts the token.
    async fn token_is_valid(&self, token: &str) -> Result<bool, AuthError>;
    /// User id the token was issued to.
    async fn resolve_identity(&self, token: &str) -> Result<i64, AuthError>;
    /// Registers an email for the token's account and returns the new user id.
    async fn register(&self, token: &str, email: &str) -> Result<i64, AuthError>;
}

#[derive(Clone, Debug)]
pub struct AuthClient {
    service: ServiceClient,
}

impl AuthClient {
    pub fn new(service: ServiceClient) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Authenticator for AuthClient {
    async fn token_is_valid(&self, token: &str) -> Result<bool, AuthError> {
        let (_, status) = self
            .service
            .send(ServiceCall::post("/auth/sign-in").header(ACCESS_TOKEN_HEADER, token))
            .await?;
        debug!("token validation answered {}", status);
        Ok(status == StatusCode::OK)
    }

    async fn resolve_identity(&self, token: &str) -> Result<i64, AuthError> {
        let identity: Identity = self
            .service
            .fetch(ServiceCall::get("/user/id").header(ACCESS_TOKEN_HEADER, token))
            .await
            .map_err(|e| match e {
                downstream::Error::Status { status, .. } => {
                    warn!("identity lookup rejected with {}", status);
                    AuthError::InvalidToken
                }
                e => AuthError::Downstream(e),
            })?;
        Ok(identity.uuid)
    }

    async fn register(&self, token: &str, email: &str) -> Result<i64, AuthError> {
        let identity: Identity = self
            .service
            .fetch(
                ServiceCall::post("/auth/register")
                    .header(ACCESS_TOKEN_HEADER, token)
                    .json(&Registration {
                        email: email.to_string(),
                    }),
            )
            .await?;
        Ok(identity.uuid)
    }
}
