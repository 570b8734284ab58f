use appserver_core::{
    payment_list_camel_to_snake, validate_text, BookingFilter, BookingList, BookingsUserList,
    ChatList, ChatMessages, FavoriteRoom, FavoriteRoomList, FavoriteRoomSchema, Message,
    MessageSchema, Participant, PushToken, Room, RoomFilter, RoomList, User, Wallet,
};
use log::info;
use std::sync::Arc;

use super::{Backends, Error};
use crate::infra::{chat::Chat, downstream::ServiceCall, notifier::Notification};

/// Everything scoped to the caller: profile, wallet, device token, chats and favorites.
pub struct Me {
    backends: Arc<Backends>,
    chat: Arc<dyn Chat>,
}

impl Me {
    pub fn new(backends: Arc<Backends>, chat: Arc<dyn Chat>) -> Self {
        Self { backends, chat }
    }

    pub async fn profile(&self, caller_id: i64) -> Result<User, Error> {
        self.backends.user(caller_id).await
    }

    pub async fn wallet(&self, caller_id: i64) -> Result<Wallet, Error> {
        Ok(self
            .backends
            .payments
            .fetch(ServiceCall::get(format!("/wallets/{}", caller_id)))
            .await?)
    }

    /// Bookings made by the caller and bookings received on the caller's rooms.
    pub async fn bookings(&self, caller_id: i64) -> Result<BookingsUserList, Error> {
        let made = self.bookings_matching(&BookingFilter::booked_by(caller_id)).await?;
        let received = self.bookings_matching(&BookingFilter::owned_by(caller_id)).await?;
        Ok(BookingsUserList { made, received })
    }

    async fn bookings_matching(&self, filter: &BookingFilter) -> Result<BookingList, Error> {
        let (body, _) = self
            .backends
            .payments
            .call(ServiceCall::get("/bookings").query(filter.query_pairs()))
            .await?;
        Ok(payment_list_camel_to_snake(&body)?.into())
    }

    pub async fn rooms(&self, caller_id: i64) -> Result<RoomList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get("/rooms").query(RoomFilter::owned_by(caller_id).query_pairs()))
            .await?)
    }

    pub async fn set_push_token(&self, caller_id: i64, push_token: String) -> Result<PushToken, Error> {
        self.backends
            .notifications
            .notifier()
            .set_push_token(caller_id, &push_token)
            .await?;
        info!("push token registered for user {}", caller_id);
        Ok(PushToken {
            push_token: Some(push_token),
        })
    }

    pub async fn push_token(&self, caller_id: i64) -> Result<PushToken, Error> {
        let push_token = self
            .backends
            .notifications
            .notifier()
            .get_push_token(caller_id)
            .await?;
        Ok(PushToken { push_token })
    }

    /// Unregisters the caller's device and returns the token it had.
    pub async fn delete_push_token(&self, caller_id: i64) -> Result<PushToken, Error> {
        let push_token = self
            .backends
            .notifications
            .notifier()
            .remove_push_token(caller_id)
            .await?;
        Ok(PushToken { push_token })
    }

    pub async fn chats(&self, caller_id: i64) -> Result<ChatList, Error> {
        Ok(self.chat.chats_of(caller_id).await?.into())
    }

    pub async fn messages(&self, caller_id: i64, other_id: i64) -> Result<ChatMessages, Error> {
        Ok(self.chat.messages_between(caller_id, other_id).await?.into())
    }

    pub async fn send_message(
        &self,
        caller_id: i64,
        other_id: i64,
        schema: MessageSchema,
    ) -> Result<Message, Error> {
        validate_text("message", &schema.message)?;
        if caller_id == other_id {
            return Err(Error::BadRequest(String::from(
                "You can't send a message to yourself",
            )));
        }

        let sender = Participant {
            name: self.backends.user(caller_id).await?.display_name(),
            uuid: caller_id,
        };
        let receiver = Participant {
            name: self.backends.user(other_id).await?.display_name(),
            uuid: other_id,
        };

        let message = self
            .chat
            .send_message(&schema.message, &sender, &receiver)
            .await?;

        self.backends.notify(
            caller_id,
            other_id,
            Notification::NewChatMessage {
                sender: sender.name,
            },
        );
        Ok(message)
    }

    /// Marks a room as favorite and returns it.
    pub async fn add_favorite(&self, caller_id: i64, schema: FavoriteRoomSchema) -> Result<Room, Error> {
        let room = self.backends.room(schema.room_id).await?;
        self.backends
            .users
            .call(ServiceCall::post(format!("/users/{}/favorite_rooms", caller_id)).json(&schema))
            .await?;
        Ok(room)
    }

    pub async fn favorites(&self, caller_id: i64) -> Result<RoomList, Error> {
        let favorites: FavoriteRoomList = self
            .backends
            .users
            .fetch(ServiceCall::get(format!("/users/{}/favorite_rooms", caller_id)))
            .await?;
        if favorites.favorites.is_empty() {
            return Ok(RoomList::default());
        }

        let filter = RoomFilter::with_ids(favorites.favorites.iter().map(|f| f.room_id));
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get("/rooms").query(filter.query_pairs()))
            .await?)
    }

    /// Removes a favorite and returns the room it pointed to.
    pub async fn delete_favorite(&self, caller_id: i64, favorite_id: i64) -> Result<Room, Error> {
        let favorite: FavoriteRoom = self
            .backends
            .users
            .fetch(ServiceCall::get(format!(
                "/users/{}/favorite_rooms/{}",
                caller_id, favorite_id
            )))
            .await?;
        let room = self.backends.room(favorite.room_id).await?;

        self.backends
            .users
            .call(ServiceCall::delete(format!(
                "/users/{}/favorite_rooms/{}",
                caller_id, favorite_id
            )))
            .await?;
        Ok(room)
    }
}
