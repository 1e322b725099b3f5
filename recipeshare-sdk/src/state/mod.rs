use indexmap::IndexMap;
use yew::AttrValue;
use yewdux::Store;

use crate::model::{
    friendship::{RelationshipState, Transition},
    user::User,
};

/// What the profile page shows about the viewer's relationship with the
/// profile owner. May run ahead of the store while `processing` is set.
#[derive(Default, Clone, PartialEq, Debug, Store)]
pub struct FriendshipProjection {
    pub subject: AttrValue,
    pub state: RelationshipState,
    /// the subject's friends count
    pub friends_count: usize,
    pub processing: bool,
    pub loaded: bool,
}

impl FriendshipProjection {
    pub fn loaded(subject: AttrValue, state: RelationshipState, friends_count: usize) -> Self {
        Self {
            subject,
            state,
            friends_count,
            processing: false,
            loaded: true,
        }
    }

    /// Show the end state of `transition` before the store confirms it.
    pub fn project(&mut self, transition: &Transition) {
        self.state = transition.to;
        self.friends_count = apply_delta(self.friends_count, transition.count_delta);
        self.processing = true;
    }

    pub fn label(&self) -> &'static str {
        self.state.label()
    }
}

pub(crate) fn apply_delta(count: usize, delta: i64) -> usize {
    if delta >= 0 {
        count.saturating_add(delta as usize)
    } else {
        count.saturating_sub(delta.unsigned_abs() as usize)
    }
}

/// The viewer's own friend list and the requests waiting on them.
#[derive(Default, Clone, PartialEq, Debug, Store)]
pub struct FriendsState {
    pub friends: IndexMap<AttrValue, User>,
    pub requests: Vec<User>,
    /// users with an action still waiting on the store
    pub busy: Vec<AttrValue>,
}

impl FriendsState {
    pub fn friends_count(&self) -> usize {
        self.friends.len()
    }

    /// Take a request out of the inbox.
    pub fn take_request(&mut self, requester_id: &str) -> Option<User> {
        let pos = self
            .requests
            .iter()
            .position(|user| user.id.as_str() == requester_id)?;
        Some(self.requests.remove(pos))
    }

    /// Put a request back where it was, unless a reload already did.
    pub fn restore_request(&mut self, index: usize, user: User) {
        if self.requests.iter().any(|u| u.id == user.id) {
            return;
        }
        let index = index.min(self.requests.len());
        self.requests.insert(index, user);
    }

    pub fn restore_friend(&mut self, index: usize, user: User) {
        if self.friends.contains_key(&user.id) {
            return;
        }
        let index = index.min(self.friends.len());
        self.friends.shift_insert(index, user.id.clone(), user);
    }

    pub fn is_busy(&self, user_id: &str) -> bool {
        self.busy.iter().any(|id| id.as_str() == user_id)
    }
}
