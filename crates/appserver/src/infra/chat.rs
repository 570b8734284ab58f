use appserver_core::{chat_name, ChatPreview, Message, Participant};
use async_trait::async_trait;
use log::debug;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

use super::firebase::{Error, RealtimeDatabase};
use crate::config::FirebaseSettings;

#[async_trait]
pub trait Chat: Send + Sync {
    async fn send_message(
        &self,
        message: &str,
        sender: &Participant,
        receiver: &Participant,
    ) -> Result<Message, Error>;
    /// Oldest first.
    async fn messages_between(&self, user_id: i64, other_id: i64) -> Result<Vec<Message>, Error>;
    /// One preview per conversation, most recent first.
    async fn chats_of(&self, user_id: i64) -> Result<Vec<ChatPreview>, Error>;
}

fn new_message(message: &str, sender: &Participant, receiver: &Participant) -> Message {
    Message {
        message: message.to_string(),
        sender_uuid: sender.uuid,
        sender_name: sender.name.clone(),
        receiver_uuid: receiver.uuid,
        receiver_name: receiver.name.clone(),
        timestamp: OffsetDateTime::now_utc().unix_timestamp(),
    }
}

/// Last message of a conversation, stored once per participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatEntry {
    timestamp: i64,
    last_message: Message,
}

impl ChatEntry {
    fn preview_for(self, user_id: i64) -> ChatPreview {
        let last = self.last_message;
        let (other_user, other_uuid) = if last.sender_uuid == user_id {
            (last.receiver_name, last.receiver_uuid)
        } else {
            (last.sender_name, last.sender_uuid)
        };
        ChatPreview {
            other_user,
            other_uuid,
            last_message: last.message,
        }
    }
}

/// Conversations kept in the realtime database.
///
/// Messages are appended under `<messages>/<chat name>`, previews are written to
/// `<chats>/-<user>/-<other user>` for both participants.
#[derive(Clone)]
pub struct FirebaseChat {
    database: RealtimeDatabase,
    chats_path: String,
    messages_path: String,
}

impl FirebaseChat {
    pub fn new(client: ClientWithMiddleware, settings: &FirebaseSettings) -> Self {
        Self {
            database: RealtimeDatabase::new(client, settings),
            chats_path: settings.chats_path.clone(),
            messages_path: settings.messages_path.clone(),
        }
    }

    fn preview_path(&self, user_id: i64, other_id: i64) -> String {
        format!("{}/-{}/-{}", self.chats_path, user_id, other_id)
    }
}

#[async_trait]
impl Chat for FirebaseChat {
    async fn send_message(
        &self,
        message: &str,
        sender: &Participant,
        receiver: &Participant,
    ) -> Result<Message, Error> {
        let message = new_message(message, sender, receiver);
        let conversation = chat_name(sender.uuid, receiver.uuid);

        let key = self
            .database
            .push(&format!("{}/{}", self.messages_path, conversation), &message)
            .await?;
        debug!("stored message {} in chat {}", key, conversation);

        let entry = ChatEntry {
            timestamp: message.timestamp,
            last_message: message.clone(),
        };
        self.database
            .put(&self.preview_path(sender.uuid, receiver.uuid), &entry)
            .await?;
        self.database
            .put(&self.preview_path(receiver.uuid, sender.uuid), &entry)
            .await?;

        Ok(message)
    }

    async fn messages_between(&self, user_id: i64, other_id: i64) -> Result<Vec<Message>, Error> {
        let path = format!("{}/{}", self.messages_path, chat_name(user_id, other_id));
        // push keys sort chronologically
        let messages: Option<BTreeMap<String, Message>> = self.database.get(&path).await?;
        Ok(messages
            .map(|messages| messages.into_values().collect())
            .unwrap_or_default())
    }

    async fn chats_of(&self, user_id: i64) -> Result<Vec<ChatPreview>, Error> {
        let path = format!("{}/-{}", self.chats_path, user_id);
        let entries: Option<BTreeMap<String, Option<ChatEntry>>> =
            self.database.get(&path).await?;

        let mut entries: Vec<ChatEntry> = entries
            .map(|entries| entries.into_values().flatten().collect())
            .unwrap_or_default();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(entries
            .into_iter()
            .map(|entry| entry.preview_for(user_id))
            .collect())
    }
}

/// Used when firebase is disabled, messages are echoed back but never stored.
#[derive(Clone, Debug, Default)]
pub struct NoopChat;

#[async_trait]
impl Chat for NoopChat {
    async fn send_message(
        &self,
        message: &str,
        sender: &Participant,
        receiver: &Participant,
    ) -> Result<Message, Error> {
        Ok(new_message(message, sender, receiver))
    }

    async fn messages_between(&self, _user_id: i64, _other_id: i64) -> Result<Vec<Message>, Error> {
        Ok(Vec::new())
    }

    async fn chats_of(&self, _user_id: i64) -> Result<Vec<ChatPreview>, Error> {
        Ok(Vec::new())
    }
}
