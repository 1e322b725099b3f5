//! Friendship state machine over the directed `friendships` table.
//!
//! A friendship between two users is stored as a single directed row, so
//! every read has to look at both directions: the row `viewer -> subject`
//! first, then `subject -> viewer`.

use crate::api::RelationshipStore;

pub use self::{inbox::Inbox, projection::ProfileFriendship};

mod count;
mod inbox;
mod projection;
mod state;

/// Stateless operations on the relationship store.
pub struct FriendshipService<'a> {
    store: &'a dyn RelationshipStore,
}

impl<'a> FriendshipService<'a> {
    pub fn new(store: &'a dyn RelationshipStore) -> Self {
        Self { store }
    }
}
