use std::rc::Rc;

use yew::AttrValue;

use crate::api::{self, RelationshipStore, RestClient, UserApi};
use crate::error::{Error, Result};
use crate::friendship::FriendshipService;
use crate::model::user::{Identity, NewUser, ProfileUpdate, User};

/// Who is signed in and which backends to talk to. Handed to every
/// component that needs it instead of being looked up globally.
#[derive(Clone)]
pub struct Session {
    identity: Option<Identity>,
    relationships: Rc<dyn RelationshipStore>,
    users: Rc<dyn UserApi>,
}

impl Session {
    pub fn new(
        identity: Option<Identity>,
        relationships: Rc<dyn RelationshipStore>,
        users: Rc<dyn UserApi>,
    ) -> Self {
        Self {
            identity,
            relationships,
            users,
        }
    }

    /// Session backed by the hosted REST API.
    pub fn connect(client: RestClient, identity: Option<Identity>) -> Self {
        Self::new(
            identity,
            Rc::from(api::relationships(client.clone())),
            Rc::from(api::users(client)),
        )
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn viewer(&self) -> Result<&AttrValue> {
        self.identity
            .as_ref()
            .map(|identity| &identity.sub)
            .ok_or(Error::Unauthenticated)
    }

    pub fn is_own_profile(&self, user_id: &str) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.sub.as_str() == user_id)
    }

    pub fn relationships(&self) -> &dyn RelationshipStore {
        self.relationships.as_ref()
    }

    pub fn users(&self) -> &dyn UserApi {
        self.users.as_ref()
    }

    pub fn friendships(&self) -> FriendshipService<'_> {
        FriendshipService::new(self.relationships.as_ref())
    }

    /// Make sure the signed-in user has a `users` row. Returns whether one
    /// was created.
    pub async fn sync_user(&self) -> Result<bool> {
        let identity = self.identity.as_ref().ok_or(Error::Unauthenticated)?;
        if self.users.find_user(&identity.sub).await?.is_some() {
            log::debug!("user already exists: {}", identity.sub);
            return Ok(false);
        }
        match self.users.create_user(NewUser::from(identity)).await {
            Ok(_) => {
                log::info!("user created: {}", identity.sub);
                Ok(true)
            }
            // another tab won the race
            Err(Error::Conflict(_)) => Ok(false),
            Err(err) => {
                log::error!("error creating user: {:?}", err);
                Err(err)
            }
        }
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User> {
        let viewer = self.viewer()?;
        self.users.update_profile(viewer, update).await
    }

    /// Friends of `user_id` with their profiles, keyed by id.
    pub async fn friends(&self, user_id: &str) -> Result<indexmap::IndexMap<AttrValue, User>> {
        let ids = self.friendships().friend_ids(user_id).await?;
        if ids.is_empty() {
            return Ok(Default::default());
        }
        let users = self.users.get_users(&ids).await?;
        Ok(users
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect())
    }

    /// Profiles of everyone waiting on the viewer to answer.
    pub async fn pending_requests(&self) -> Result<Vec<User>> {
        let viewer = self.viewer()?;
        let ids = self.friendships().requester_ids(viewer).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.users.get_users(&ids).await
    }
}
