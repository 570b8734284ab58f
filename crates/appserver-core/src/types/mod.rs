//! Payload types exchanged with clients and with the downstream services.
//!
//! Unknown fields are ignored on the way in so downstream services can grow
//! their payloads without breaking the gateway.

mod bookings;
mod chat;
mod rooms;
mod users;

pub use bookings::*;
pub use chat::*;
pub use rooms::*;
pub use users::*;

use serde::{Deserialize, Serialize};

/// `{"uuid": ..}` body returned by the auth service for a valid token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub uuid: i64,
}
