//! In-process stand-in for the hosted tables.
//!
//! Enforces the same rules the database does: one row per directed pair,
//! status updates only when the row is still in the expected status. Used by
//! the test suites and for offline demos.

use std::cell::{Cell, RefCell};

use indexmap::IndexMap;
use yew::AttrValue;

use crate::api::relationship::RelationshipStore;
use crate::api::user::UserApi;
use crate::error::{Error, Result};
use crate::model::friendship::{EdgeFilter, EdgeStatus, FriendshipEdge, NewFriendship};
use crate::model::user::{NewUser, ProfileUpdate, User};

#[derive(Debug, Default)]
pub struct MemoryStore {
    edges: RefCell<Vec<FriendshipEdge>>,
    users: RefCell<IndexMap<AttrValue, User>>,
    next_id: Cell<u64>,
    /// error handed to the next write instead of performing it
    fail_next: RefCell<Option<Error>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write fail with `err`, leaving the data untouched.
    pub fn fail_next_write(&self, err: Error) {
        *self.fail_next.borrow_mut() = Some(err);
    }

    pub fn edges(&self) -> Vec<FriendshipEdge> {
        self.edges.borrow().clone()
    }

    pub fn insert_user(&self, user: User) {
        self.users.borrow_mut().insert(user.id.clone(), user);
    }

    fn injected(&self) -> Result<()> {
        match self.fail_next.borrow_mut().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> AttrValue {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        AttrValue::from(format!("fs-{id}"))
    }
}

#[async_trait::async_trait(?Send)]
impl RelationshipStore for MemoryStore {
    async fn create_edge(&self, edge: NewFriendship) -> Result<FriendshipEdge> {
        self.injected()?;
        let mut edges = self.edges.borrow_mut();
        if edges
            .iter()
            .any(|e| e.requester_id == edge.user_id && e.target_id == edge.friend_id)
        {
            return Err(Error::conflict(format!(
                "friendship {} -> {} already exists",
                edge.user_id, edge.friend_id
            )));
        }
        let now = chrono::Utc::now();
        let row = FriendshipEdge {
            id: self.next_id(),
            requester_id: edge.user_id,
            target_id: edge.friend_id,
            status: edge.status,
            created_at: Some(now),
            updated_at: Some(now),
        };
        edges.push(row.clone());
        Ok(row)
    }

    async fn update_edge_status(
        &self,
        requester_id: &str,
        target_id: &str,
        from: EdgeStatus,
        to: EdgeStatus,
    ) -> Result<FriendshipEdge> {
        self.injected()?;
        let mut edges = self.edges.borrow_mut();
        let row = edges
            .iter_mut()
            .find(|e| {
                e.requester_id.as_str() == requester_id
                    && e.target_id.as_str() == target_id
                    && e.status == from
            })
            .ok_or_else(|| {
                Error::not_found(format!("no {from} request from {requester_id} to {target_id}"))
            })?;
        row.status = to;
        row.updated_at = Some(chrono::Utc::now());
        Ok(row.clone())
    }

    async fn delete_edge(
        &self,
        requester_id: &str,
        target_id: &str,
        status: EdgeStatus,
    ) -> Result<usize> {
        self.injected()?;
        let mut edges = self.edges.borrow_mut();
        let before = edges.len();
        edges.retain(|e| {
            !(e.requester_id.as_str() == requester_id
                && e.target_id.as_str() == target_id
                && e.status == status)
        });
        Ok(before - edges.len())
    }

    async fn delete_between(&self, a: &str, b: &str, status: EdgeStatus) -> Result<usize> {
        self.injected()?;
        let mut edges = self.edges.borrow_mut();
        let before = edges.len();
        edges.retain(|e| !(e.touches(a) && e.touches(b) && e.status == status));
        Ok(before - edges.len())
    }

    async fn find_edge(
        &self,
        requester_id: &str,
        target_id: &str,
    ) -> Result<Option<FriendshipEdge>> {
        Ok(self
            .edges
            .borrow()
            .iter()
            .find(|e| e.requester_id.as_str() == requester_id && e.target_id.as_str() == target_id)
            .cloned())
    }

    async fn list_edges(&self, filter: &EdgeFilter) -> Result<Vec<FriendshipEdge>> {
        Ok(self
            .edges
            .borrow()
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn count_edges(&self, filter: &EdgeFilter) -> Result<usize> {
        Ok(self.edges.borrow().iter().filter(|e| filter.matches(e)).count())
    }
}

#[async_trait::async_trait(?Send)]
impl UserApi for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id}")))
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        let users = self.users.borrow();
        Ok(users
            .values()
            .filter(|user| ids.iter().any(|id| id.as_str() == user.id.as_str()))
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.borrow().get(&AttrValue::from(id.to_string())).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.injected()?;
        let mut users = self.users.borrow_mut();
        if users.contains_key(&user.id) {
            return Err(Error::conflict(format!("user {} already exists", user.id)));
        }
        let mut user = User::from(user);
        user.created_at = Some(chrono::Utc::now());
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User> {
        self.injected()?;
        let mut users = self.users.borrow_mut();
        let user = users
            .get_mut(&AttrValue::from(id.to_string()))
            .ok_or_else(|| Error::not_found(format!("user {id}")))?;
        update.apply_to(user);
        Ok(user.clone())
    }
}
