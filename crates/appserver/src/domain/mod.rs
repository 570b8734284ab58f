mod bookings;
mod me;
mod photos;
mod rooms;
mod users;

pub use bookings::*;
pub use me::*;
pub use photos::*;
pub use rooms::*;
pub use users::*;

use appserver_core::{CoreError, Room, User};
use log::warn;
use thiserror::Error;

use crate::infra::{
    auth::AuthError,
    downstream::{self, ServiceCall, ServiceClient},
    firebase,
    notifier::{Notification, NotificationDispatcher},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Downstream(#[from] downstream::Error),
    #[error("invalid downstream payload: {0}")]
    Shape(CoreError),
    #[error("problem querying db: {0}")]
    DbError(#[from] sqlx::Error),
    #[error("{0}")]
    Firebase(#[from] firebase::Error),
}

impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Validation(message) => Error::BadRequest(message),
            e => Error::Shape(e),
        }
    }
}

/// Downstream services shared by every orchestration service.
#[derive(Clone)]
pub struct Backends {
    pub listing: ServiceClient,
    pub users: ServiceClient,
    pub payments: ServiceClient,
    pub notifications: NotificationDispatcher,
}

impl Backends {
    pub async fn room(&self, room_id: i64) -> Result<Room, Error> {
        Ok(self
            .listing
            .fetch(ServiceCall::get(format!("/rooms/{}", room_id)))
            .await?)
    }

    pub async fn user(&self, user_id: i64) -> Result<User, Error> {
        Ok(self
            .users
            .fetch(ServiceCall::get(format!("/users/{}", user_id)))
            .await?)
    }

    /// Resolves the sender's name and queues the notification.
    ///
    /// Nothing is sent when the sender can't be resolved or is also the receiver.
    pub async fn notify_from<F>(&self, sender_id: i64, receiver_id: i64, notification: F)
    where
        F: FnOnce(String) -> Notification,
    {
        if sender_id == receiver_id {
            return;
        }
        match self.user(sender_id).await {
            Ok(sender) => self
                .notifications
                .dispatch(receiver_id, notification(sender.display_name())),
            Err(e) => warn!(
                "skipping notification to {}, sender {} not resolved: {}",
                receiver_id, sender_id, e
            ),
        }
    }

    pub fn notify(&self, sender_id: i64, receiver_id: i64, notification: Notification) {
        if sender_id != receiver_id {
            self.notifications.dispatch(receiver_id, notification);
        }
    }
}
