use axum::{extract::State, http::StatusCode, response::ErrorResponse};
use log::error;
use std::sync::Arc;

use crate::startup::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Result<StatusCode, ErrorResponse> {
    state.photos.ping().await.map_err(|e| {
        error!("health check failed: {:?}", e);
        e
    })?;
    Ok(StatusCode::OK)
}
