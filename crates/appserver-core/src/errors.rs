//! Shared error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("missing field `{0}` in downstream payload")]
    MissingField(String),

    #[error("unexpected payload shape: {0}")]
    Shape(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
