use std::rc::Rc;

use yewdux::Dispatch;

use crate::error::{Error, Result};
use crate::model::friendship::{FriendAction, Pair, RelationshipState, Transition};
use crate::model::notification::Notification;
use crate::session::Session;
use crate::state::FriendshipProjection;

/// Drives the friend button on someone else's profile.
///
/// Every action is projected into [`FriendshipProjection`] right away and
/// rolled back if the store rejects the write.
pub struct ProfileFriendship {
    session: Session,
    dispatch: Dispatch<FriendshipProjection>,
}

impl ProfileFriendship {
    pub fn new(session: Session, dispatch: Dispatch<FriendshipProjection>) -> Self {
        Self { session, dispatch }
    }

    pub fn projection(&self) -> Rc<FriendshipProjection> {
        self.dispatch.get()
    }

    /// Read state and count for `subject` from the store. Anonymous viewers
    /// get `none`.
    pub async fn load(&self, subject: &str) -> Result<()> {
        let service = self.session.friendships();
        let state = match self.session.viewer() {
            Ok(viewer) => {
                let pair = Pair::new(viewer.clone(), subject.to_string())?;
                service.derive_state(&pair).await?
            }
            Err(_) => RelationshipState::None,
        };
        let friends_count = service.friends_count(subject).await?;
        self.dispatch.set(FriendshipProjection::loaded(
            subject.to_string().into(),
            state,
            friends_count,
        ));
        Ok(())
    }

    pub async fn refresh(&self) -> Result<()> {
        let subject = self.dispatch.get().subject.clone();
        self.load(&subject).await
    }

    /// Run whatever the button currently offers.
    pub async fn click(&self) -> Result<Transition> {
        let action = self.dispatch.get().state.primary_action();
        self.perform(action).await
    }

    pub async fn perform(&self, action: FriendAction) -> Result<Transition> {
        let snapshot = self.dispatch.get();
        if !snapshot.loaded {
            return Err(Error::not_found("no profile loaded"));
        }
        if snapshot.processing {
            return Err(Error::InProgress);
        }
        let viewer = self.session.viewer()?.clone();
        let pair = Pair::new(viewer, snapshot.subject.clone())?;
        let transition = snapshot.state.plan(&pair, action)?;

        self.dispatch.reduce_mut(|p| p.project(&transition));
        match self.session.friendships().execute(&transition).await {
            Ok(()) => {
                self.dispatch.reduce_mut(|p| p.processing = false);
                Ok(transition)
            }
            Err(err) => {
                log::error!("error handling friend action {}: {:?}", action, err);
                self.dispatch.set((*snapshot).clone());
                if err.is_benign() {
                    // the row we tried to create is already there; show it
                    if let Err(refresh_err) = self.refresh().await {
                        log::warn!("refresh after conflict failed: {:?}", refresh_err);
                    }
                }
                Err(err)
            }
        }
    }

    /// [`perform`](Self::perform), reporting failures as a notification
    /// instead of returning them.
    pub async fn perform_and_notify(
        &self,
        action: FriendAction,
        notifications: &Dispatch<Notification>,
    ) -> Option<Transition> {
        match self.perform(action).await {
            Ok(transition) => Some(transition),
            Err(err) => {
                Notification::from_error(action, err).notify_to(notifications);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryStore, RelationshipStore};
    use crate::model::friendship::{EdgeStatus, NewFriendship};
    use crate::model::notification::NotificationType;
    use crate::model::user::Identity;

    struct Fixture {
        store: Rc<MemoryStore>,
        cx: yewdux::Context,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: Rc::new(MemoryStore::new()),
                cx: yewdux::Context::new(),
            }
        }

        fn profile(&self, viewer: Option<&'static str>) -> ProfileFriendship {
            let identity = viewer.map(|sub| Identity {
                sub: sub.into(),
                ..Default::default()
            });
            let session = Session::new(identity, self.store.clone(), self.store.clone());
            ProfileFriendship::new(session, Dispatch::new(&self.cx))
        }
    }

    #[tokio::test]
    async fn accept_projects_and_commits() {
        let fx = Fixture::new();
        fx.store
            .create_edge(NewFriendship::request("b".into(), "a".into()))
            .await
            .unwrap();
        let profile = fx.profile(Some("a"));
        profile.load("b").await.unwrap();
        assert_eq!(profile.projection().state, RelationshipState::PendingReceived);
        assert_eq!(profile.projection().label(), "Accept Request");

        let transition = profile.click().await.unwrap();
        assert_eq!(transition.action, FriendAction::Accept);
        let projection = profile.projection();
        assert_eq!(projection.state, RelationshipState::Friends);
        assert_eq!(projection.friends_count, 1);
        assert!(!projection.processing);

        profile.refresh().await.unwrap();
        assert_eq!(profile.projection().friends_count, 1);
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let fx = Fixture::new();
        let profile = fx.profile(Some("a"));
        profile.load("b").await.unwrap();
        let before = profile.projection();

        fx.store.fail_next_write(Error::Request("offline".to_string()));
        let err = profile.perform(FriendAction::SendRequest).await.unwrap_err();
        assert_eq!(err, Error::Request("offline".to_string()));
        assert_eq!(profile.projection(), before);
        assert!(fx.store.edges().is_empty());
    }

    #[tokio::test]
    async fn raced_accept_reports_and_keeps_state() {
        let fx = Fixture::new();
        fx.store
            .create_edge(NewFriendship::request("b".into(), "a".into()))
            .await
            .unwrap();
        let profile = fx.profile(Some("a"));
        profile.load("b").await.unwrap();
        // b withdraws before a clicks
        fx.store
            .delete_edge("b", "a", EdgeStatus::Pending)
            .await
            .unwrap();

        let notifications = Dispatch::<Notification>::new(&fx.cx);
        assert!(profile
            .perform_and_notify(FriendAction::Accept, &notifications)
            .await
            .is_none());
        assert_eq!(notifications.get().type_, NotificationType::Error);
        assert_eq!(profile.projection().state, RelationshipState::PendingReceived);
        assert_eq!(profile.projection().friends_count, 0);

        profile.refresh().await.unwrap();
        assert_eq!(profile.projection().state, RelationshipState::None);
    }

    #[tokio::test]
    async fn duplicate_request_reconciles_with_store() {
        let fx = Fixture::new();
        let profile = fx.profile(Some("a"));
        profile.load("b").await.unwrap();
        // sent from another tab after this page loaded
        fx.store
            .create_edge(NewFriendship::request("a".into(), "b".into()))
            .await
            .unwrap();

        let err = profile.click().await.unwrap_err();
        assert!(err.is_benign());
        assert_eq!(profile.projection().state, RelationshipState::PendingSent);
        assert_eq!(fx.store.edges().len(), 1);
    }

    #[tokio::test]
    async fn unfriend_counts_down() {
        let fx = Fixture::new();
        fx.store
            .create_edge(NewFriendship::request("a".into(), "b".into()))
            .await
            .unwrap();
        fx.store
            .update_edge_status("a", "b", EdgeStatus::Pending, EdgeStatus::Accepted)
            .await
            .unwrap();
        let profile = fx.profile(Some("b"));
        profile.load("a").await.unwrap();
        assert_eq!(profile.projection().friends_count, 1);

        profile.perform(FriendAction::Unfriend).await.unwrap();
        assert_eq!(profile.projection().state, RelationshipState::None);
        assert_eq!(profile.projection().friends_count, 0);
        assert!(matches!(
            profile.perform(FriendAction::Unfriend).await,
            Err(Error::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn anonymous_viewer_sees_count_only() {
        let fx = Fixture::new();
        let profile = fx.profile(None);
        profile.load("b").await.unwrap();
        assert_eq!(profile.projection().state, RelationshipState::None);
        assert_eq!(profile.click().await, Err(Error::Unauthenticated));
        assert!(!profile.projection().processing);
    }

    #[tokio::test]
    async fn own_profile_is_rejected() {
        let fx = Fixture::new();
        let profile = fx.profile(Some("a"));
        assert_eq!(profile.load("a").await, Err(Error::SelfRelationship));
        assert!(matches!(
            profile.click().await,
            Err(Error::NotFound(_))
        ));
    }
}
