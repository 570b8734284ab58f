use appserver_core::{
    can_comment, can_modify, validate_text, NewRoom, NewRoomComment, NewRoomRating,
    NewRoomReview, PaymentRoom, Room, RoomComment, RoomCommentList, RoomCommentSchema,
    RoomFilter, RoomList, RoomRating, RoomRatingList, RoomRatingSchema, RoomRatingUpdate,
    RoomReview, RoomReviewList, RoomReviewSchema, RoomReviewUpdate, RoomSchema, RoomUpdate,
};
use log::info;
use serde_json::json;
use std::sync::Arc;

use super::{Backends, Error};
use crate::infra::{downstream::ServiceCall, notifier::Notification};

pub struct Rooms {
    backends: Arc<Backends>,
}

impl Rooms {
    pub fn new(backends: Arc<Backends>) -> Self {
        Self { backends }
    }

    /// Publishes a room owned by the caller and registers its price for bookings.
    pub async fn create(&self, caller_id: i64, schema: RoomSchema) -> Result<Room, Error> {
        let owner = self.backends.user(caller_id).await?;
        let new_room = NewRoom {
            room: schema,
            owner: owner.display_name(),
            owner_uuid: caller_id,
        };

        let room: Room = self
            .backends
            .listing
            .fetch(ServiceCall::post("/rooms").json(&new_room))
            .await?;
        self.backends
            .payments
            .call(ServiceCall::post("/rooms").json(&PaymentRoom::from(&room)))
            .await?;

        info!("room {} published by user {}", room.id, caller_id);
        Ok(room)
    }

    pub async fn list(&self, filter: &RoomFilter) -> Result<RoomList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get("/rooms").query(filter.query_pairs()))
            .await?)
    }

    pub async fn get(&self, room_id: i64) -> Result<Room, Error> {
        self.backends.room(room_id).await
    }

    pub async fn update(
        &self,
        caller_id: i64,
        room_id: i64,
        update: RoomUpdate,
    ) -> Result<Room, Error> {
        let room = self.backends.room(room_id).await?;
        if !can_modify(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from(
                "You can't modify another user's room",
            )));
        }

        let updated: Room = self
            .backends
            .listing
            .fetch(ServiceCall::patch(format!("/rooms/{}", room_id)).json(&update))
            .await?;

        if let Some(price) = update.price_per_day {
            self.backends
                .payments
                .call(ServiceCall::patch(format!("/rooms/{}", room_id)).json(&json!({ "price": price })))
                .await?;
        }
        Ok(updated)
    }

    pub async fn delete(&self, caller_id: i64, room_id: i64) -> Result<Room, Error> {
        let room = self.backends.room(room_id).await?;
        if !can_modify(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from(
                "You can't delete another user's room",
            )));
        }

        let deleted: Room = self
            .backends
            .listing
            .fetch(ServiceCall::delete(format!("/rooms/{}", room_id)))
            .await?;
        self.backends
            .payments
            .call(ServiceCall::delete(format!("/rooms/{}", room_id)))
            .await?;

        info!("room {} deleted by user {}", room_id, caller_id);
        Ok(deleted)
    }

    pub async fn recommendations(&self) -> Result<RoomList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get("/recomendations"))
            .await?)
    }
}

/// Ratings, reviews and comments left on rooms.
pub struct RoomFeedback {
    backends: Arc<Backends>,
}

impl RoomFeedback {
    pub fn new(backends: Arc<Backends>) -> Self {
        Self { backends }
    }

    pub async fn rate(
        &self,
        caller_id: i64,
        room_id: i64,
        schema: RoomRatingSchema,
    ) -> Result<RoomRating, Error> {
        let room = self.backends.room(room_id).await?;
        if !can_comment(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from("You can't rate your own room")));
        }
        let reviewer = self.backends.user(caller_id).await?.display_name();

        let rating: RoomRating = self
            .backends
            .listing
            .fetch(
                ServiceCall::post(format!("/rooms/{}/ratings", room_id)).json(&NewRoomRating {
                    rating: schema.rating,
                    reviewer: reviewer.clone(),
                    reviewer_id: caller_id,
                }),
            )
            .await?;

        self.backends.notify(
            caller_id,
            room.owner_uuid,
            Notification::NewRoomRating {
                sender: reviewer,
                room_title: room.title,
                rating: rating.rating,
            },
        );
        Ok(rating)
    }

    pub async fn ratings(&self, room_id: i64) -> Result<RoomRatingList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!("/rooms/{}/ratings", room_id)))
            .await?)
    }

    pub async fn rating(&self, room_id: i64, rating_id: i64) -> Result<RoomRating, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!(
                "/rooms/{}/ratings/{}",
                room_id, rating_id
            )))
            .await?)
    }

    pub async fn update_rating(
        &self,
        caller_id: i64,
        room_id: i64,
        rating_id: i64,
        update: RoomRatingUpdate,
    ) -> Result<RoomRating, Error> {
        let rating = self.rating(room_id, rating_id).await?;
        if !can_modify(caller_id, rating.reviewer_id) {
            return Err(Error::Forbidden(String::from(
                "You can't modify the rating of another user",
            )));
        }
        Ok(self
            .backends
            .listing
            .fetch(
                ServiceCall::patch(format!("/rooms/{}/ratings/{}", room_id, rating_id))
                    .json(&update),
            )
            .await?)
    }

    pub async fn delete_rating(
        &self,
        caller_id: i64,
        room_id: i64,
        rating_id: i64,
    ) -> Result<RoomRating, Error> {
        let rating = self.rating(room_id, rating_id).await?;
        if !can_modify(caller_id, rating.reviewer_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the rating of another user",
            )));
        }
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::delete(format!(
                "/rooms/{}/ratings/{}",
                room_id, rating_id
            )))
            .await?)
    }

    pub async fn review(
        &self,
        caller_id: i64,
        room_id: i64,
        schema: RoomReviewSchema,
    ) -> Result<RoomReview, Error> {
        validate_text("review", &schema.review)?;
        let room = self.backends.room(room_id).await?;
        if !can_comment(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from(
                "You can't review your own room",
            )));
        }
        let reviewer = self.backends.user(caller_id).await?.display_name();

        let review: RoomReview = self
            .backends
            .listing
            .fetch(
                ServiceCall::post(format!("/rooms/{}/reviews", room_id)).json(&NewRoomReview {
                    review: schema.review,
                    reviewer: reviewer.clone(),
                    reviewer_id: caller_id,
                }),
            )
            .await?;

        self.backends.notify(
            caller_id,
            room.owner_uuid,
            Notification::NewRoomReview {
                sender: reviewer,
                room_title: room.title,
            },
        );
        Ok(review)
    }

    pub async fn reviews(&self, room_id: i64) -> Result<RoomReviewList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!("/rooms/{}/reviews", room_id)))
            .await?)
    }

    pub async fn get_review(&self, room_id: i64, review_id: i64) -> Result<RoomReview, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!(
                "/rooms/{}/reviews/{}",
                room_id, review_id
            )))
            .await?)
    }

    pub async fn update_review(
        &self,
        caller_id: i64,
        room_id: i64,
        review_id: i64,
        update: RoomReviewUpdate,
    ) -> Result<RoomReview, Error> {
        if let Some(review) = &update.review {
            validate_text("review", review)?;
        }
        let review = self.get_review(room_id, review_id).await?;
        if !can_modify(caller_id, review.reviewer_id) {
            return Err(Error::Forbidden(String::from(
                "You can't modify the review of another user",
            )));
        }
        Ok(self
            .backends
            .listing
            .fetch(
                ServiceCall::patch(format!("/rooms/{}/reviews/{}", room_id, review_id))
                    .json(&update),
            )
            .await?)
    }

    pub async fn delete_review(
        &self,
        caller_id: i64,
        room_id: i64,
        review_id: i64,
    ) -> Result<RoomReview, Error> {
        let review = self.get_review(room_id, review_id).await?;
        if !can_modify(caller_id, review.reviewer_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the review of another user",
            )));
        }
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::delete(format!(
                "/rooms/{}/reviews/{}",
                room_id, review_id
            )))
            .await?)
    }

    /// Comments on a room or answers an existing comment.
    ///
    /// Owners can't open a thread on their own room but can answer in one. An
    /// answer from the owner notifies the author of the thread, anything else
    /// notifies the owner.
    pub async fn comment(
        &self,
        caller_id: i64,
        room_id: i64,
        schema: RoomCommentSchema,
    ) -> Result<RoomComment, Error> {
        validate_text("comment", &schema.comment)?;
        let room = self.backends.room(room_id).await?;
        if !schema.is_reply() && !can_comment(caller_id, room.owner_uuid) {
            return Err(Error::Forbidden(String::from(
                "You can't comment your own room",
            )));
        }

        let thread = match schema.main_comment_id {
            Some(main_comment_id) => Some(self.get_comment(room_id, main_comment_id).await?),
            None => None,
        };
        let commentator = self.backends.user(caller_id).await?.display_name();

        let comment: RoomComment = self
            .backends
            .listing
            .fetch(
                ServiceCall::post(format!("/rooms/{}/comments", room_id)).json(&NewRoomComment {
                    comment: schema.comment,
                    main_comment_id: schema.main_comment_id,
                    commentator: commentator.clone(),
                    commentator_id: caller_id,
                }),
            )
            .await?;

        match thread {
            Some(thread) if caller_id == room.owner_uuid => self.backends.notify(
                caller_id,
                thread.commentator_id,
                Notification::AnsweredComment {
                    sender: commentator,
                    room_title: room.title,
                },
            ),
            _ => self.backends.notify(
                caller_id,
                room.owner_uuid,
                Notification::NewComment {
                    sender: commentator,
                    room_title: room.title,
                },
            ),
        }
        Ok(comment)
    }

    pub async fn comments(&self, room_id: i64) -> Result<RoomCommentList, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!("/rooms/{}/comments", room_id)))
            .await?)
    }

    pub async fn get_comment(&self, room_id: i64, comment_id: i64) -> Result<RoomComment, Error> {
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::get(format!(
                "/rooms/{}/comments/{}",
                room_id, comment_id
            )))
            .await?)
    }

    pub async fn delete_comment(
        &self,
        caller_id: i64,
        room_id: i64,
        comment_id: i64,
    ) -> Result<RoomComment, Error> {
        let comment = self.get_comment(room_id, comment_id).await?;
        if !can_modify(caller_id, comment.commentator_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the comment of another user",
            )));
        }
        Ok(self
            .backends
            .listing
            .fetch(ServiceCall::delete(format!(
                "/rooms/{}/comments/{}",
                room_id, comment_id
            )))
            .await?)
    }
}
