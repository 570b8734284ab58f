use axum::{extract::FromRequestParts, http::request::Parts};
use log::debug;
use std::sync::Arc;

use crate::{
    domain::Error,
    infra::auth::{AuthError, ACCESS_TOKEN_HEADER},
    startup::AppState,
};

/// Raw `x-access-token` header, rejected when absent or blank.
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)?;

        Ok(AccessToken(token.to_string()))
    }
}

/// Authenticated user behind the request.
///
/// The token is checked with the auth service before its identity is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
}

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AccessToken(token) = AccessToken::from_request_parts(parts, state).await?;

        if !state.authenticator.token_is_valid(&token).await? {
            debug!("rejected token for {}", parts.uri.path());
            return Err(AuthError::InvalidToken.into());
        }
        let id = state.authenticator.resolve_identity(&token).await?;

        Ok(Caller { id })
    }
}
