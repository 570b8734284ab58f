pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod startup;

pub use config::*;
pub use domain::{Backends, Error as AppError};
pub use infra::auth::{AuthClient, AuthError, Authenticator};
pub use infra::chat::{Chat, FirebaseChat, NoopChat};
pub use infra::db::*;
pub use infra::downstream::{Error as DownstreamError, Service, ServiceCall, ServiceClient};
pub use infra::notifier::{
    FirebaseNotifier, NoopNotifier, Notification, NotificationDispatcher, Notifier,
};
pub use infra::storage::{FirebaseStorage, NoopStorage, PhotoStorage};
pub use startup::*;
