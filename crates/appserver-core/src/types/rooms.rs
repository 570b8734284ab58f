use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSchema {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub capacity: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub price_per_day: i64,
}

/// Room creation payload for the listing service, denormalized with its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRoom {
    #[serde(flatten)]
    pub room: RoomSchema,
    pub owner: String,
    pub owner_uuid: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub owner: String,
    pub owner_uuid: i64,
    pub price_per_day: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub location: String,
    pub capacity: i64,
    #[serde(default)]
    pub blocked: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_day: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomList {
    pub amount: usize,
    pub rooms: Vec<Room>,
}

/// Room registration in the payment service, used there to price bookings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRoom {
    pub id: i64,
    pub price: i64,
    pub owner_id: i64,
}

impl From<&Room> for PaymentRoom {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            price: room.price_per_day,
            owner_id: room.owner_uuid,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRatingSchema {
    pub rating: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRatingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRoomRating {
    pub rating: i64,
    pub reviewer: String,
    pub reviewer_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRating {
    pub id: i64,
    pub room_id: i64,
    pub rating: i64,
    pub reviewer: String,
    pub reviewer_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRatingList {
    pub amount: usize,
    pub room_id: i64,
    pub ratings: Vec<RoomRating>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomReviewSchema {
    pub review: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomReviewUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRoomReview {
    pub review: String,
    pub reviewer: String,
    pub reviewer_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomReview {
    pub id: i64,
    pub room_id: i64,
    pub review: String,
    pub reviewer: String,
    pub reviewer_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomReviewList {
    pub amount: usize,
    pub room_id: i64,
    pub reviews: Vec<RoomReview>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomCommentSchema {
    pub comment: String,
    /// Set when the comment answers an existing thread
    #[serde(default)]
    pub main_comment_id: Option<i64>,
}

impl RoomCommentSchema {
    pub fn is_reply(&self) -> bool {
        self.main_comment_id.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRoomComment {
    pub comment: String,
    pub main_comment_id: Option<i64>,
    pub commentator: String,
    pub commentator_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomComment {
    pub id: i64,
    pub room_id: i64,
    pub comment: String,
    pub commentator: String,
    pub commentator_id: i64,
    #[serde(default)]
    pub main_comment_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomCommentWithAnswers {
    pub comment: RoomComment,
    pub answers: Vec<RoomComment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomCommentList {
    pub amount: usize,
    pub room_id: i64,
    pub comments: Vec<RoomCommentWithAnswers>,
}

/// Photo metadata registered in the listing service once the blob is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRoomPhoto {
    pub url: String,
    pub firebase_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomPhoto {
    pub url: String,
    pub firebase_id: i64,
    pub id: i64,
    pub room_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomPhotoList {
    pub amount: usize,
    pub room_id: i64,
    pub room_photos: Vec<RoomPhoto>,
}
