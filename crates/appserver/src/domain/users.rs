use appserver_core::{
    can_comment, can_modify, validate_text, FeedbackRole, NewUser, NewUserRating, NewUserReview,
    NewWallet, User, UserList, UserRating, UserRatingList, UserRatingSchema, UserReview,
    UserReviewList, UserReviewSchema, UserSchema, UserUpdate, Wallet,
};
use log::info;
use std::sync::Arc;

use super::{Backends, Error};
use crate::infra::{auth::Authenticator, downstream::ServiceCall, notifier::Notification};

pub struct Users {
    backends: Arc<Backends>,
    authenticator: Arc<dyn Authenticator>,
}

impl Users {
    pub fn new(backends: Arc<Backends>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            backends,
            authenticator,
        }
    }

    /// Signs up the account behind the token.
    ///
    /// The auth service hands out the user id, the profile and an empty wallet are
    /// created under it.
    pub async fn create(&self, token: &str, schema: UserSchema) -> Result<User, Error> {
        let user_id = self.authenticator.register(token, &schema.email).await?;

        let user: User = self
            .backends
            .users
            .fetch(ServiceCall::post("/users").json(&NewUser {
                id: user_id,
                profile: schema,
            }))
            .await?;

        let wallet: Wallet = self
            .backends
            .payments
            .fetch(ServiceCall::post("/wallets").json(&NewWallet { uuid: user_id }))
            .await?;

        info!("user {} registered with wallet {}", user.id, wallet.address);
        Ok(user)
    }

    pub async fn list(&self) -> Result<UserList, Error> {
        Ok(self.backends.users.fetch(ServiceCall::get("/users")).await?)
    }

    pub async fn get(&self, user_id: i64) -> Result<User, Error> {
        self.backends.user(user_id).await
    }

    pub async fn update(&self, caller_id: i64, user_id: i64, update: UserUpdate) -> Result<User, Error> {
        if !can_modify(caller_id, user_id) {
            return Err(Error::Forbidden(String::from(
                "You can't modify the profile of another user",
            )));
        }
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::patch(format!("/users/{}", user_id)).json(&update))
            .await?)
    }

    pub async fn delete(&self, caller_id: i64, user_id: i64) -> Result<User, Error> {
        if !can_modify(caller_id, user_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the profile of another user",
            )));
        }
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::delete(format!("/users/{}", user_id)))
            .await?)
    }

    pub async fn rate(
        &self,
        caller_id: i64,
        user_id: i64,
        role: FeedbackRole,
        schema: UserRatingSchema,
    ) -> Result<UserRating, Error> {
        if !can_comment(caller_id, user_id) {
            return Err(Error::Forbidden(String::from("You can't rate yourself")));
        }
        let reviewer = self.backends.user(caller_id).await?.display_name();

        let rating: UserRating = self
            .backends
            .users
            .fetch(
                ServiceCall::post(format!("/users/{}/{}", user_id, role.ratings_path())).json(
                    &NewUserRating {
                        rating: schema.rating,
                        reviewer: reviewer.clone(),
                        reviewer_id: caller_id,
                    },
                ),
            )
            .await?;

        self.backends.notify(
            caller_id,
            user_id,
            Notification::NewUserRating {
                sender: reviewer,
                role,
                rating: rating.rating,
            },
        );
        Ok(rating)
    }

    pub async fn ratings(&self, user_id: i64, role: FeedbackRole) -> Result<UserRatingList, Error> {
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::get(format!(
                "/users/{}/{}",
                user_id,
                role.ratings_path()
            )))
            .await?)
    }

    pub async fn rating(
        &self,
        user_id: i64,
        role: FeedbackRole,
        rating_id: i64,
    ) -> Result<UserRating, Error> {
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::get(format!(
                "/users/{}/{}/{}",
                user_id,
                role.ratings_path(),
                rating_id
            )))
            .await?)
    }

    pub async fn delete_rating(
        &self,
        caller_id: i64,
        user_id: i64,
        role: FeedbackRole,
        rating_id: i64,
    ) -> Result<UserRating, Error> {
        let rating = self.rating(user_id, role, rating_id).await?;
        if !can_modify(caller_id, rating.reviewer_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the rating of another user",
            )));
        }
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::delete(format!(
                "/users/{}/{}/{}",
                user_id,
                role.ratings_path(),
                rating_id
            )))
            .await?)
    }

    pub async fn review(
        &self,
        caller_id: i64,
        user_id: i64,
        role: FeedbackRole,
        schema: UserReviewSchema,
    ) -> Result<UserReview, Error> {
        validate_text("review", &schema.review)?;
        if !can_comment(caller_id, user_id) {
            return Err(Error::Forbidden(String::from("You can't review yourself")));
        }
        let reviewer = self.backends.user(caller_id).await?.display_name();

        let review: UserReview = self
            .backends
            .users
            .fetch(
                ServiceCall::post(format!("/users/{}/{}", user_id, role.reviews_path())).json(
                    &NewUserReview {
                        review: schema.review,
                        reviewer: reviewer.clone(),
                        reviewer_id: caller_id,
                    },
                ),
            )
            .await?;

        self.backends.notify(
            caller_id,
            user_id,
            Notification::NewUserReview {
                sender: reviewer,
                role,
            },
        );
        Ok(review)
    }

    pub async fn reviews(&self, user_id: i64, role: FeedbackRole) -> Result<UserReviewList, Error> {
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::get(format!(
                "/users/{}/{}",
                user_id,
                role.reviews_path()
            )))
            .await?)
    }

    pub async fn get_review(
        &self,
        user_id: i64,
        role: FeedbackRole,
        review_id: i64,
    ) -> Result<UserReview, Error> {
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::get(format!(
                "/users/{}/{}/{}",
                user_id,
                role.reviews_path(),
                review_id
            )))
            .await?)
    }

    pub async fn delete_review(
        &self,
        caller_id: i64,
        user_id: i64,
        role: FeedbackRole,
        review_id: i64,
    ) -> Result<UserReview, Error> {
        let review = self.get_review(user_id, role, review_id).await?;
        if !can_modify(caller_id, review.reviewer_id) {
            return Err(Error::Forbidden(String::from(
                "You can't delete the review of another user",
            )));
        }
        Ok(self
            .backends
            .users
            .fetch(ServiceCall::delete(format!(
                "/users/{}/{}/{}",
                user_id,
                role.reviews_path(),
                review_id
            )))
            .await?)
    }
}
