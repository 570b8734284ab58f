//! Typed optional query filters forwarded to downstream list endpoints.
//!
//! Only present fields are serialized, an empty filter yields no query pairs.

use serde::{Deserialize, Serialize};

pub type QueryPairs = Vec<(&'static str, String)>;

/// Booking list filter, named the way the payment service expects it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    pub booker_id: Option<i64>,
    pub room_owner_id: Option<i64>,
    pub room_id: Option<i64>,
    pub booking_status: Option<i64>,
}

impl BookingFilter {
    pub fn booked_by(booker_id: i64) -> Self {
        Self {
            booker_id: Some(booker_id),
            ..Default::default()
        }
    }

    pub fn owned_by(room_owner_id: i64) -> Self {
        Self {
            room_owner_id: Some(room_owner_id),
            ..Default::default()
        }
    }

    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push(&mut pairs, "bookerId", self.booker_id);
        push(&mut pairs, "roomOwnerId", self.room_owner_id);
        push(&mut pairs, "roomId", self.room_id);
        push(&mut pairs, "bookingStatus", self.booking_status);
        pairs
    }
}

/// Room list filter for the listing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomFilter {
    pub owner_uuid: Option<i64>,
    #[serde(rename = "type")]
    pub room_type: Option<String>,
    pub capacity: Option<i64>,
    /// Repeated as `ids=1&ids=2`, not accepted from clients
    #[serde(default, skip_deserializing)]
    pub ids: Vec<i64>,
}

impl RoomFilter {
    pub fn owned_by(owner_uuid: i64) -> Self {
        Self {
            owner_uuid: Some(owner_uuid),
            ..Default::default()
        }
    }

    pub fn with_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn query_pairs(&self) -> QueryPairs {
        let mut pairs = QueryPairs::new();
        push(&mut pairs, "owner_uuid", self.owner_uuid);
        push(&mut pairs, "type", self.room_type.as_ref());
        push(&mut pairs, "capacity", self.capacity);
        pairs.extend(self.ids.iter().map(|id| ("ids", id.to_string())));
        pairs
    }
}

fn push<T: ToString>(pairs: &mut QueryPairs, name: &'static str, value: Option<T>) {
    if let Some(value) = value {
        pairs.push((name, value.to_string()));
    }
}
