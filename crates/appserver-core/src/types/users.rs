use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSchema {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phonenumber: String,
    pub country: String,
    pub birthdate: String,
}

/// Profile creation payload for the user service, keyed by the auth-service id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    pub id: i64,
    #[serde(flatten)]
    pub profile: UserSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phonenumber: String,
    pub country: String,
    pub birthdate: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Name denormalized into rooms, ratings, reviews, comments and chats.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonenumber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserList {
    pub amount: usize,
    pub users: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wallet {
    pub uuid: i64,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    #[serde(default)]
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWallet {
    pub uuid: i64,
}

/// Kind of user feedback: as the owner of a room, or as a guest in one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackRole {
    Host,
    Guest,
}

impl FeedbackRole {
    pub fn ratings_path(&self) -> &'static str {
        match self {
            Self::Host => "host_ratings",
            Self::Guest => "guest_ratings",
        }
    }

    pub fn reviews_path(&self) -> &'static str {
        match self {
            Self::Host => "host_reviews",
            Self::Guest => "guest_reviews",
        }
    }
}

impl std::fmt::Display for FeedbackRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRatingSchema {
    pub rating: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUserRating {
    pub rating: i64,
    pub reviewer: String,
    pub reviewer_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRating {
    pub id: i64,
    pub rating: i64,
    pub reviewer: String,
    pub reviewer_id: i64,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRatingList {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub amount: usize,
    pub ratings: Vec<UserRating>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserReviewSchema {
    pub review: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUserReview {
    pub review: String,
    pub reviewer: String,
    pub reviewer_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserReview {
    pub id: i64,
    pub review: String,
    pub reviewer: String,
    pub reviewer_id: i64,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(rename = "updatedAt", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserReviewList {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub amount: usize,
    pub reviews: Vec<UserReview>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteRoomSchema {
    pub room_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteRoom {
    pub id: i64,
    pub room_id: i64,
    #[serde(rename = "userId")]
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FavoriteRoomList {
    pub favorites: Vec<FavoriteRoom>,
}

/// Device token registered by a client to receive push notifications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushTokenSchema {
    pub push_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PushToken {
    pub push_token: Option<String>,
}
