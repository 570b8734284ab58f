//! Ownership rules applied before any mutating downstream call.
//!
//! Identities are the integer user ids handed out by the auth service.

/// Only the owner of a resource may update or delete it.
pub fn can_modify(viewer_id: i64, owner_id: i64) -> bool {
    viewer_id == owner_id
}

/// Rating, reviewing and top-level commenting is reserved to users other than the owner.
pub fn can_comment(viewer_id: i64, owner_id: i64) -> bool {
    viewer_id != owner_id
}

/// Nobody can book their own room.
pub fn can_book(owner_id: i64, requester_id: i64) -> bool {
    owner_id != requester_id
}
