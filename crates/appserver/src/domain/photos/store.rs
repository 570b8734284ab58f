use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};
use std::sync::atomic::{AtomicI64, Ordering};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    domain::Error,
    infra::db::{parse_required_datetime, DBConnection},
};

/// Links the id a photo was stored under with the listing-service photo record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomPhotoLink {
    pub id: i64,
    pub firebase_id: i64,
    pub room_photo_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl FromRow<'_, SqliteRow> for RoomPhotoLink {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(RoomPhotoLink {
            id: row.get("id"),
            firebase_id: row.get("firebase_id"),
            room_photo_id: row.get("room_photo_id"),
            created_at: parse_required_datetime(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PhotoLinkStore {
    db_connection: DBConnection,
}

impl PhotoLinkStore {
    pub fn new(db_connection: DBConnection) -> Self {
        Self { db_connection }
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        self.db_connection.ping().await
    }

    pub async fn add_link(&self, firebase_id: i64, room_photo_id: i64) -> Result<RoomPhotoLink, Error> {
        let now = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let link = sqlx::query_as::<_, RoomPhotoLink>(
            "INSERT INTO room_photo_links (firebase_id, room_photo_id, created_at)
            VALUES (?, ?, ?)
            RETURNING id, firebase_id, room_photo_id, created_at",
        )
        .bind(firebase_id)
        .bind(room_photo_id)
        .bind(now)
        .fetch_one(self.db_connection.write())
        .await?;

        Ok(link)
    }

    pub async fn get_link(&self, firebase_id: i64) -> Result<Option<RoomPhotoLink>, Error> {
        let link = sqlx::query_as::<_, RoomPhotoLink>(
            "SELECT id, firebase_id, room_photo_id, created_at
            FROM room_photo_links
            WHERE firebase_id = ?",
        )
        .bind(firebase_id)
        .fetch_optional(self.db_connection.read())
        .await?;

        Ok(link)
    }

    pub async fn delete_link(&self, firebase_id: i64) -> Result<RoomPhotoLink, Error> {
        let link = sqlx::query_as::<_, RoomPhotoLink>(
            "DELETE FROM room_photo_links
            WHERE firebase_id = ?
            RETURNING id, firebase_id, room_photo_id, created_at",
        )
        .bind(firebase_id)
        .fetch_optional(self.db_connection.write())
        .await?;

        link.ok_or_else(|| Error::NotFound(format!("photo {}", firebase_id)))
    }
}

/// Hands out storage ids for room photos.
///
/// Seeded from the clock in milliseconds so ids keep growing across restarts,
/// then strictly increasing within the process.
#[derive(Debug)]
pub struct PhotoIdGenerator {
    last: AtomicI64,
}

impl Default for PhotoIdGenerator {
    fn default() -> Self {
        let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        Self::starting_at(millis as i64)
    }
}

impl PhotoIdGenerator {
    pub fn starting_at(seed: i64) -> Self {
        Self {
            last: AtomicI64::new(seed),
        }
    }

    pub fn next_id(&self) -> i64 {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let now = now as i64;
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(current) => last = current,
            }
        }
    }
}
