mod bookings;
mod health_check;
mod me;
mod photos;
mod rooms;
mod users;

pub use bookings::*;
pub use health_check::*;
pub use me::*;
pub use photos::*;
pub use rooms::*;
pub use users::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    domain::Error,
    infra::{auth::AuthError, downstream, firebase},
};

const EXTERNAL_FAILURE: &str = "Failed to contact external resource";

fn downstream_response(error: &downstream::Error) -> (StatusCode, String) {
    match error {
        downstream::Error::Status {
            status, message, ..
        } => (*status, message.clone()),
        downstream::Error::Request(..) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            String::from("internal server error"),
        ),
        _ => (StatusCode::BAD_GATEWAY, String::from(EXTERNAL_FAILURE)),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Error::Auth(AuthError::MissingToken) => {
                (StatusCode::BAD_REQUEST, AuthError::MissingToken.to_string())
            }
            Error::Auth(AuthError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, AuthError::InvalidToken.to_string())
            }
            Error::Auth(AuthError::Downstream(e)) | Error::Downstream(e) => downstream_response(&e),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, format!("{} not found", msg)),
            Error::Firebase(firebase::Error::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, format!("{} not found", msg))
            }
            Error::Firebase(firebase::Error::Url(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("internal server error"),
            ),
            Error::Firebase(_) => (StatusCode::BAD_GATEWAY, String::from(EXTERNAL_FAILURE)),
            Error::Shape(_) | Error::DbError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("internal server error"),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
