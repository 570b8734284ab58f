use appserver_core::FeedbackRole;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest_middleware::{reqwest::header::AUTHORIZATION, ClientWithMiddleware};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::sync::Arc;
use tokio_util::task::TaskTracker;

use super::firebase::{ensure_success, Error, RealtimeDatabase};
use crate::config::FirebaseSettings;

/// Push notifications sent to users after something happened to them or their rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    NewBooking { sender: String, room_title: String },
    BookingAccepted { sender: String, room_title: String },
    BookingRejected { sender: String, room_title: String },
    NewComment { sender: String, room_title: String },
    AnsweredComment { sender: String, room_title: String },
    NewRoomRating {
        sender: String,
        room_title: String,
        rating: i64,
    },
    NewRoomReview { sender: String, room_title: String },
    NewUserRating {
        sender: String,
        role: FeedbackRole,
        rating: i64,
    },
    NewUserReview { sender: String, role: FeedbackRole },
    NewChatMessage { sender: String },
}

impl Notification {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NewBooking { .. } => "New booking received",
            Self::BookingAccepted { .. } => "Your booking was accepted",
            Self::BookingRejected { .. } => "Your booking was rejected",
            Self::NewComment { .. } => "New comment received",
            Self::AnsweredComment { .. } => "Your comment was answered",
            Self::NewRoomRating { .. } => "New rating on your room",
            Self::NewRoomReview { .. } => "New review on your room",
            Self::NewUserRating { .. } => "New rating received",
            Self::NewUserReview { .. } => "New review received",
            Self::NewChatMessage { .. } => "New chat message",
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::NewBooking { sender, room_title } => {
                format!("{} made a booking on your room {}", sender, room_title)
            }
            Self::BookingAccepted { sender, room_title } => {
                format!("{} accepted your booking on {}", sender, room_title)
            }
            Self::BookingRejected { sender, room_title } => {
                format!("{} rejected your booking on {}", sender, room_title)
            }
            Self::NewComment { sender, room_title } => {
                format!("{} commented on your room {}", sender, room_title)
            }
            Self::AnsweredComment { sender, room_title } => {
                format!("{} answered your comment on {}", sender, room_title)
            }
            Self::NewRoomRating {
                sender,
                room_title,
                rating,
            } => format!("{} rated your room {} with {}", sender, room_title, rating),
            Self::NewRoomReview { sender, room_title } => {
                format!("{} wrote a review of your room {}", sender, room_title)
            }
            Self::NewUserRating {
                sender,
                role,
                rating,
            } => format!("{} rated you as {} with {}", sender, role, rating),
            Self::NewUserReview { sender, role } => {
                format!("{} wrote a review of you as {}", sender, role)
            }
            Self::NewChatMessage { sender } => format!("New message from {}", sender),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn set_push_token(&self, user_id: i64, token: &str) -> Result<(), Error>;
    async fn get_push_token(&self, user_id: i64) -> Result<Option<String>, Error>;
    /// Returns the token that was registered, if any.
    async fn remove_push_token(&self, user_id: i64) -> Result<Option<String>, Error>;
    async fn send(&self, token: &str, title: &str, body: &str) -> Result<(), Error>;

    /// Sends to the user's device, `false` when no device is registered.
    async fn notify(&self, user_id: i64, notification: &Notification) -> Result<bool, Error> {
        let Some(token) = self.get_push_token(user_id).await? else {
            return Ok(false);
        };
        self.send(&token, notification.title(), &notification.body())
            .await?;
        Ok(true)
    }
}

/// Device tokens live in the realtime database, messages go out through FCM.
#[derive(Clone)]
pub struct FirebaseNotifier {
    database: RealtimeDatabase,
    tokens_path: String,
    client: ClientWithMiddleware,
    messaging_url: String,
    messaging_key: SecretString,
}

impl FirebaseNotifier {
    pub fn new(client: ClientWithMiddleware, settings: &FirebaseSettings) -> Self {
        Self {
            database: RealtimeDatabase::new(client.clone(), settings),
            tokens_path: settings.notifications_path.clone(),
            client,
            messaging_url: settings.messaging_url.clone(),
            messaging_key: SecretString::from(settings.messaging_key.clone()),
        }
    }

    fn token_path(&self, user_id: i64) -> String {
        format!("{}/{}", self.tokens_path, user_id)
    }
}

#[async_trait]
impl Notifier for FirebaseNotifier {
    async fn set_push_token(&self, user_id: i64, token: &str) -> Result<(), Error> {
        self.database.put(&self.token_path(user_id), token).await
    }

    async fn get_push_token(&self, user_id: i64) -> Result<Option<String>, Error> {
        self.database.get(&self.token_path(user_id)).await
    }

    async fn remove_push_token(&self, user_id: i64) -> Result<Option<String>, Error> {
        let token = self.get_push_token(user_id).await?;
        self.database.delete(&self.token_path(user_id)).await?;
        Ok(token)
    }

    async fn send(&self, token: &str, title: &str, body: &str) -> Result<(), Error> {
        let response = self
            .client
            .post(&self.messaging_url)
            .header(
                AUTHORIZATION,
                format!("key={}", self.messaging_key.expose_secret()),
            )
            .json(&json!({
                "to": token,
                "notification": {
                    "title": title,
                    "body": body,
                },
            }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Used when firebase is disabled: tokens are dropped and nothing is delivered.
#[derive(Clone, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn set_push_token(&self, _user_id: i64, _token: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn get_push_token(&self, _user_id: i64) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn remove_push_token(&self, _user_id: i64) -> Result<Option<String>, Error> {
        Ok(None)
    }

    async fn send(&self, _token: &str, _title: &str, _body: &str) -> Result<(), Error> {
        Ok(())
    }
}

/// Best effort delivery on tracked background tasks.
///
/// Callers never see the outcome, failures only show up in the logs.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, tracker: TaskTracker) -> Self {
        Self { notifier, tracker }
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        self.notifier.clone()
    }

    pub fn dispatch(&self, receiver_id: i64, notification: Notification) {
        let notifier = self.notifier.clone();
        self.tracker.spawn(async move {
            match notifier.notify(receiver_id, &notification).await {
                Ok(true) => info!("notified user {}: {}", receiver_id, notification.title()),
                Ok(false) => debug!("user {} has no registered device", receiver_id),
                Err(e) => warn!(
                    "failed to notify user {} ({}): {}",
                    receiver_id,
                    notification.title(),
                    e
                ),
            }
        });
    }
}
