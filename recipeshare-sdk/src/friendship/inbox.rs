use std::rc::Rc;

use yew::AttrValue;
use yewdux::Dispatch;

use crate::error::{Error, Result};
use crate::model::friendship::{FriendAction, Pair, RelationshipState, Transition};
use crate::model::notification::Notification;
use crate::model::user::User;
use crate::session::Session;
use crate::state::FriendsState;

/// The viewer's own friend list and incoming requests.
///
/// Every action re-reads the relationship from the store before writing, so
/// a stale list can never turn a decline into an unfriend.
pub struct Inbox {
    session: Session,
    dispatch: Dispatch<FriendsState>,
}

/// The list entry an action took away, put back if the write fails.
enum Removed {
    Request { index: usize, user: User },
    Friend { index: usize, user: User },
}

impl Removed {
    fn revert(self, state: &mut FriendsState) {
        match self {
            Removed::Request { index, user } => {
                state.friends.shift_remove(&user.id);
                state.restore_request(index, user);
            }
            Removed::Friend { index, user } => state.restore_friend(index, user),
        }
    }
}

impl Inbox {
    pub fn new(session: Session, dispatch: Dispatch<FriendsState>) -> Self {
        Self { session, dispatch }
    }

    pub fn state(&self) -> Rc<FriendsState> {
        self.dispatch.get()
    }

    pub async fn load(&self) -> Result<()> {
        let viewer = self.session.viewer()?;
        let friends = self.session.friends(viewer).await?;
        let requests = self.session.pending_requests().await?;
        log::debug!(
            "{} has {} friends and {} requests",
            viewer,
            friends.len(),
            requests.len()
        );
        self.dispatch.reduce_mut(|s| {
            s.friends = friends;
            s.requests = requests;
        });
        Ok(())
    }

    pub async fn accept(&self, requester_id: &str) -> Result<Transition> {
        self.respond(requester_id, FriendAction::Accept).await
    }

    pub async fn decline(&self, requester_id: &str) -> Result<Transition> {
        self.respond(requester_id, FriendAction::Decline).await
    }

    pub async fn unfriend(&self, friend_id: &str) -> Result<Transition> {
        self.run(friend_id, RelationshipState::Friends, FriendAction::Unfriend).await
    }

    /// Answer a request and report the outcome as a notification.
    pub async fn respond_and_notify(
        &self,
        requester_id: &str,
        action: FriendAction,
        notifications: &Dispatch<Notification>,
    ) -> Option<Transition> {
        match self.respond(requester_id, action).await {
            Ok(transition) => {
                if let Some(done) = Notification::done(action) {
                    done.notify_to(notifications);
                }
                Some(transition)
            }
            Err(err) => {
                Notification::from_error(action, err).notify_to(notifications);
                None
            }
        }
    }

    async fn respond(&self, requester_id: &str, action: FriendAction) -> Result<Transition> {
        self.run(requester_id, RelationshipState::PendingReceived, action).await
    }

    /// One action per user at a time; actions on different users may
    /// overlap.
    async fn run(
        &self,
        other: &str,
        expected: RelationshipState,
        action: FriendAction,
    ) -> Result<Transition> {
        if self.dispatch.get().is_busy(other) {
            return Err(Error::InProgress);
        }
        let key = AttrValue::from(other.to_string());
        self.dispatch.reduce_mut(|s| s.busy.push(key.clone()));
        let result = self.run_marked(&key, expected, action).await;
        self.dispatch.reduce_mut(|s| s.busy.retain(|id| id != &key));
        result
    }

    async fn run_marked(
        &self,
        other: &AttrValue,
        expected: RelationshipState,
        action: FriendAction,
    ) -> Result<Transition> {
        let viewer = self.session.viewer()?.clone();
        let pair = Pair::new(viewer, other.clone())?;
        let friendships = self.session.friendships();
        let state = friendships.derive_state(&pair).await?;
        if state != expected {
            return Err(Error::InvalidTransition { state, action });
        }
        let transition = state.plan(&pair, action)?;

        // drop it from the list at once; the store has the final say
        let removed = self.project(other, action);
        if let Err(err) = friendships.execute(&transition).await {
            log::error!("error on {} {}: {:?}", action, other, err);
            if let Some(removed) = removed {
                self.dispatch.reduce_mut(|s| removed.revert(s));
            }
            return Err(err);
        }
        Ok(transition)
    }

    fn project(&self, other: &AttrValue, action: FriendAction) -> Option<Removed> {
        let current = self.dispatch.get();
        let removed = if action == FriendAction::Unfriend {
            let (index, _, user) = current.friends.get_full(other)?;
            Removed::Friend {
                index,
                user: user.clone(),
            }
        } else {
            let index = current.requests.iter().position(|u| &u.id == other)?;
            Removed::Request {
                index,
                user: current.requests[index].clone(),
            }
        };
        self.dispatch.reduce_mut(|s| match &removed {
            Removed::Friend { .. } => {
                s.friends.shift_remove(other);
            }
            Removed::Request { user, .. } => {
                s.take_request(other);
                if action == FriendAction::Accept {
                    s.friends.insert(other.clone(), user.clone());
                }
            }
        });
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryStore, RelationshipStore};
    use crate::model::friendship::{EdgeFilter, EdgeStatus, FriendshipEdge, NewFriendship};
    use crate::model::notification::NotificationType;
    use crate::model::user::Identity;

    /// Yields to the executor before every write so that concurrent actions
    /// interleave. Writes touching `refuse` fail.
    struct YieldingStore {
        inner: Rc<MemoryStore>,
        refuse: &'static str,
    }

    impl YieldingStore {
        async fn before_write(&self, ids: [&str; 2]) -> crate::error::Result<()> {
            tokio::task::yield_now().await;
            if ids.contains(&self.refuse) {
                return Err(Error::Request("offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait(?Send)]
    impl RelationshipStore for YieldingStore {
        async fn create_edge(&self, edge: NewFriendship) -> Result<FriendshipEdge> {
            self.before_write([edge.user_id.as_str(), edge.friend_id.as_str()]).await?;
            self.inner.create_edge(edge).await
        }

        async fn update_edge_status(
            &self,
            requester_id: &str,
            target_id: &str,
            from: EdgeStatus,
            to: EdgeStatus,
        ) -> Result<FriendshipEdge> {
            self.before_write([requester_id, target_id]).await?;
            self.inner.update_edge_status(requester_id, target_id, from, to).await
        }

        async fn delete_edge(
            &self,
            requester_id: &str,
            target_id: &str,
            status: EdgeStatus,
        ) -> Result<usize> {
            self.before_write([requester_id, target_id]).await?;
            self.inner.delete_edge(requester_id, target_id, status).await
        }

        async fn delete_between(&self, a: &str, b: &str, status: EdgeStatus) -> Result<usize> {
            self.before_write([a, b]).await?;
            self.inner.delete_between(a, b, status).await
        }

        async fn find_edge(
            &self,
            requester_id: &str,
            target_id: &str,
        ) -> Result<Option<FriendshipEdge>> {
            self.inner.find_edge(requester_id, target_id).await
        }

        async fn list_edges(&self, filter: &EdgeFilter) -> Result<Vec<FriendshipEdge>> {
            self.inner.list_edges(filter).await
        }

        async fn count_edges(&self, filter: &EdgeFilter) -> Result<usize> {
            self.inner.count_edges(filter).await
        }
    }

    fn user(id: &'static str, name: &'static str) -> User {
        User {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    fn me() -> Option<Identity> {
        Some(Identity {
            sub: "me".into(),
            ..Default::default()
        })
    }

    async fn seeded_store() -> Rc<MemoryStore> {
        let store = Rc::new(MemoryStore::new());
        for (id, name) in [("me", "Me"), ("ann", "Ann"), ("bob", "Bob"), ("cyd", "Cyd")] {
            store.insert_user(user(id, name));
        }
        for requester in ["ann", "bob"] {
            store
                .create_edge(NewFriendship::request(requester.into(), "me".into()))
                .await
                .unwrap();
        }
        store
    }

    async fn open(
        relationships: Rc<dyn RelationshipStore>,
        store: Rc<MemoryStore>,
    ) -> (Inbox, yewdux::Context) {
        let session = Session::new(me(), relationships, store);
        let cx = yewdux::Context::new();
        let inbox = Inbox::new(session, Dispatch::new(&cx));
        inbox.load().await.unwrap();
        (inbox, cx)
    }

    async fn setup() -> (Rc<MemoryStore>, Inbox, yewdux::Context) {
        let store = seeded_store().await;
        let (inbox, cx) = open(store.clone(), store.clone()).await;
        (store, inbox, cx)
    }

    fn request_ids(inbox: &Inbox) -> Vec<String> {
        inbox
            .state()
            .requests
            .iter()
            .map(|u| u.id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn load_lists_requesters() {
        let (_store, inbox, _cx) = setup().await;
        let state = inbox.state();
        let names: Vec<&str> = state.requests.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["Ann", "Bob"]);
        assert_eq!(state.friends_count(), 0);
    }

    #[tokio::test]
    async fn accept_moves_requester_to_friends() {
        let (store, inbox, cx) = setup().await;
        let notifications = Dispatch::<Notification>::new(&cx);
        let transition = inbox
            .respond_and_notify("ann", FriendAction::Accept, &notifications)
            .await
            .unwrap();
        assert_eq!(transition.count_delta, 1);
        assert_eq!(
            notifications.get().content.as_str(),
            "Friend request accepted!"
        );
        let state = inbox.state();
        assert_eq!(state.requests.len(), 1);
        assert!(state.friends.contains_key(&AttrValue::from("ann")));
        assert!(state.busy.is_empty());

        inbox.load().await.unwrap();
        assert_eq!(inbox.state().friends_count(), 1);
        assert_eq!(store.edges().iter().filter(|e| e.is_accepted()).count(), 1);
    }

    #[tokio::test]
    async fn failed_decline_restores_request() {
        let (store, inbox, cx) = setup().await;
        store.fail_next_write(Error::Request("offline".to_string()));
        let notifications = Dispatch::<Notification>::new(&cx);
        assert!(inbox
            .respond_and_notify("bob", FriendAction::Decline, &notifications)
            .await
            .is_none());
        assert_eq!(notifications.get().type_, NotificationType::Error);
        assert_eq!(
            notifications.get().content.as_str(),
            "Failed to decline request. Please try again."
        );
        assert_eq!(request_ids(&inbox), ["ann", "bob"]);
        assert_eq!(store.edges().len(), 2);
    }

    #[tokio::test]
    async fn decline_twice_is_rejected() {
        let (_store, inbox, _cx) = setup().await;
        inbox.decline("bob").await.unwrap();
        assert_eq!(
            inbox.decline("bob").await,
            Err(Error::InvalidTransition {
                state: RelationshipState::None,
                action: FriendAction::Decline,
            })
        );
        assert_eq!(request_ids(&inbox), ["ann"]);
    }

    #[tokio::test]
    async fn decline_after_accept_keeps_friendship() {
        let (store, inbox, _cx) = setup().await;
        inbox.accept("ann").await.unwrap();
        assert_eq!(
            inbox.decline("ann").await,
            Err(Error::InvalidTransition {
                state: RelationshipState::Friends,
                action: FriendAction::Decline,
            })
        );
        assert!(inbox.state().friends.contains_key(&AttrValue::from("ann")));
        let service = inbox.session.friendships();
        assert_eq!(service.friends_count("me").await.unwrap(), 1);
        assert_eq!(store.edges().iter().filter(|e| e.is_accepted()).count(), 1);
    }

    #[tokio::test]
    async fn unfriend_on_pending_request_is_rejected() {
        let (store, inbox, _cx) = setup().await;
        // bob asked me; I asked cyd
        store
            .create_edge(NewFriendship::request("me".into(), "cyd".into()))
            .await
            .unwrap();
        assert_eq!(
            inbox.unfriend("bob").await,
            Err(Error::InvalidTransition {
                state: RelationshipState::PendingReceived,
                action: FriendAction::Unfriend,
            })
        );
        assert_eq!(
            inbox.unfriend("cyd").await,
            Err(Error::InvalidTransition {
                state: RelationshipState::PendingSent,
                action: FriendAction::Unfriend,
            })
        );
        assert_eq!(store.edges().len(), 3);
        assert_eq!(request_ids(&inbox), ["ann", "bob"]);
    }

    #[tokio::test]
    async fn accept_without_request_never_writes() {
        let (store, inbox, _cx) = setup().await;
        // would fail the write if it were attempted
        store.fail_next_write(Error::Request("offline".to_string()));
        assert_eq!(
            inbox.accept("cyd").await,
            Err(Error::InvalidTransition {
                state: RelationshipState::None,
                action: FriendAction::Accept,
            })
        );
        assert!(inbox.state().busy.is_empty());
        inbox.accept("ann").await.unwrap_err();
        inbox.accept("ann").await.unwrap();
    }

    #[tokio::test]
    async fn unfriend_from_list() {
        let (_store, inbox, _cx) = setup().await;
        inbox.accept("ann").await.unwrap();
        let transition = inbox.unfriend("ann").await.unwrap();
        assert_eq!(transition.count_delta, -1);
        assert_eq!(inbox.state().friends_count(), 0);
        assert!(matches!(inbox.unfriend("cyd").await, Err(Error::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn overlapping_actions_roll_back_independently() {
        let store = seeded_store().await;
        let relationships = Rc::new(YieldingStore {
            inner: store.clone(),
            refuse: "ann",
        });
        let (inbox, _cx) = open(relationships, store.clone()).await;

        let (accepted, declined) = tokio::join!(inbox.accept("ann"), inbox.decline("bob"));
        assert_eq!(accepted, Err(Error::Request("offline".to_string())));
        declined.unwrap();

        let state = inbox.state();
        assert_eq!(request_ids(&inbox), ["ann"]);
        assert!(state.friends.is_empty());
        assert!(state.busy.is_empty());
        assert_eq!(store.edges().len(), 1);
    }

    #[tokio::test]
    async fn same_user_is_one_action_at_a_time() {
        let store = seeded_store().await;
        let relationships = Rc::new(YieldingStore {
            inner: store.clone(),
            refuse: "nobody",
        });
        let (inbox, _cx) = open(relationships, store.clone()).await;

        let (accepted, declined) = tokio::join!(inbox.accept("ann"), inbox.decline("ann"));
        let outcomes = [accepted.is_ok(), declined.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        assert!(accepted == Err(Error::InProgress) || declined == Err(Error::InProgress));
        assert!(inbox.state().busy.is_empty());
    }
}
