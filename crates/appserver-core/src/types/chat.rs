use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageSchema {
    pub message: String,
}

/// One side of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub uuid: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
    pub sender_uuid: i64,
    pub sender_name: String,
    pub receiver_uuid: i64,
    pub receiver_name: String,
    /// Seconds since the unix epoch
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessages {
    pub amount: usize,
    pub messages: Vec<Message>,
}

impl From<Vec<Message>> for ChatMessages {
    fn from(messages: Vec<Message>) -> Self {
        Self {
            amount: messages.len(),
            messages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatPreview {
    pub other_user: String,
    pub other_uuid: i64,
    pub last_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatList {
    pub amount: usize,
    pub chats: Vec<ChatPreview>,
}

impl From<Vec<ChatPreview>> for ChatList {
    fn from(chats: Vec<ChatPreview>) -> Self {
        Self {
            amount: chats.len(),
            chats,
        }
    }
}

/// Conversations are stored once under a key shared by both participants.
pub fn chat_name(first: i64, second: i64) -> String {
    format!("{}-{}", first.max(second), first.min(second))
}
