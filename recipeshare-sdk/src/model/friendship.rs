use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yew::AttrValue;

use crate::error::{Error, Result};

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    #[default]
    Pending,
    Accepted,
}

impl EdgeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeStatus::Pending => "pending",
            EdgeStatus::Accepted => "accepted",
        }
    }
}

impl Display for EdgeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the `friendships` table. The row is directed: `requester_id`
/// sent the request to `target_id`, even after it has been accepted.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FriendshipEdge {
    #[serde(default)]
    pub id: AttrValue,
    #[serde(rename = "user_id")]
    pub requester_id: AttrValue,
    #[serde(rename = "friend_id")]
    pub target_id: AttrValue,
    pub status: EdgeStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FriendshipEdge {
    pub fn is_accepted(&self) -> bool {
        self.status == EdgeStatus::Accepted
    }

    pub fn touches(&self, user_id: &str) -> bool {
        self.requester_id.as_str() == user_id || self.target_id.as_str() == user_id
    }

    /// The endpoint that is not `user_id`.
    pub fn counterpart(&self, user_id: &str) -> &AttrValue {
        if self.requester_id.as_str() == user_id {
            &self.target_id
        } else {
            &self.requester_id
        }
    }
}

/// Insert body for a new edge.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewFriendship {
    pub user_id: AttrValue,
    pub friend_id: AttrValue,
    pub status: EdgeStatus,
}

impl NewFriendship {
    pub fn request(requester_id: AttrValue, target_id: AttrValue) -> Self {
        Self {
            user_id: requester_id,
            friend_id: target_id,
            status: EdgeStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: EdgeStatus,
}

/// Row selector for reads and counts; unset fields match everything.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EdgeFilter {
    pub requester: Option<AttrValue>,
    pub target: Option<AttrValue>,
    pub status: Option<EdgeStatus>,
}

impl EdgeFilter {
    pub fn requested_by(mut self, user_id: impl Into<AttrValue>) -> Self {
        self.requester = Some(user_id.into());
        self
    }

    pub fn targeting(mut self, user_id: impl Into<AttrValue>) -> Self {
        self.target = Some(user_id.into());
        self
    }

    pub fn with_status(mut self, status: EdgeStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, edge: &FriendshipEdge) -> bool {
        self.requester
            .as_ref()
            .map_or(true, |id| *id == edge.requester_id)
            && self.target.as_ref().map_or(true, |id| *id == edge.target_id)
            && self.status.map_or(true, |status| status == edge.status)
    }
}

/// How the viewer relates to the profile they are looking at.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipState {
    #[default]
    None,
    /// viewer requested, waiting on the subject
    PendingSent,
    /// subject requested, waiting on the viewer
    PendingReceived,
    Friends,
}

impl Display for RelationshipState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipState::None => write!(f, "none"),
            RelationshipState::PendingSent => write!(f, "pending_sent"),
            RelationshipState::PendingReceived => write!(f, "pending_received"),
            RelationshipState::Friends => write!(f, "friends"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FriendAction {
    SendRequest,
    Accept,
    Decline,
    Cancel,
    Unfriend,
}

impl Display for FriendAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FriendAction::SendRequest => write!(f, "send request"),
            FriendAction::Accept => write!(f, "accept"),
            FriendAction::Decline => write!(f, "decline"),
            FriendAction::Cancel => write!(f, "cancel"),
            FriendAction::Unfriend => write!(f, "unfriend"),
        }
    }
}

/// Viewer and profile subject. Always two different users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub viewer: AttrValue,
    pub subject: AttrValue,
}

impl Pair {
    pub fn new(viewer: impl Into<AttrValue>, subject: impl Into<AttrValue>) -> Result<Self> {
        let viewer = viewer.into();
        let subject = subject.into();
        if viewer == subject {
            return Err(Error::SelfRelationship);
        }
        Ok(Self { viewer, subject })
    }

    pub fn reversed(&self) -> Self {
        Self {
            viewer: self.subject.clone(),
            subject: self.viewer.clone(),
        }
    }
}

/// The single store write a transition needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeEffect {
    Create {
        requester: AttrValue,
        target: AttrValue,
    },
    /// pending -> accepted, only if the row is still pending
    Accept {
        requester: AttrValue,
        target: AttrValue,
    },
    /// withdraw or decline, only if the row is still pending
    Delete {
        requester: AttrValue,
        target: AttrValue,
    },
    /// accepted edge, whichever direction exists
    DeleteBetween { a: AttrValue, b: AttrValue },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub action: FriendAction,
    pub from: RelationshipState,
    pub to: RelationshipState,
    pub effect: EdgeEffect,
    /// change to the subject's friends count once the write is confirmed
    pub count_delta: i64,
}

impl RelationshipState {
    /// Derive the state from the two possible directed edges.
    /// `sent` is viewer->subject, `received` is subject->viewer.
    pub fn from_edges(
        sent: Option<&FriendshipEdge>,
        received: Option<&FriendshipEdge>,
    ) -> Self {
        if let Some(edge) = sent {
            return match edge.status {
                EdgeStatus::Accepted => RelationshipState::Friends,
                EdgeStatus::Pending => RelationshipState::PendingSent,
            };
        }
        match received.map(|edge| edge.status) {
            Some(EdgeStatus::Accepted) => RelationshipState::Friends,
            Some(EdgeStatus::Pending) => RelationshipState::PendingReceived,
            None => RelationshipState::None,
        }
    }

    /// The one action a profile view offers in this state.
    pub fn primary_action(&self) -> FriendAction {
        match self {
            RelationshipState::None => FriendAction::SendRequest,
            RelationshipState::PendingSent => FriendAction::Cancel,
            RelationshipState::PendingReceived => FriendAction::Accept,
            RelationshipState::Friends => FriendAction::Unfriend,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RelationshipState::None => "Add Friend",
            RelationshipState::PendingSent => "Request Sent",
            RelationshipState::PendingReceived => "Accept Request",
            RelationshipState::Friends => "Friends",
        }
    }

    pub fn plan(self, pair: &Pair, action: FriendAction) -> Result<Transition> {
        let viewer = pair.viewer.clone();
        let subject = pair.subject.clone();
        let (to, effect, count_delta) = match (self, action) {
            (RelationshipState::None, FriendAction::SendRequest) => (
                RelationshipState::PendingSent,
                EdgeEffect::Create {
                    requester: viewer,
                    target: subject,
                },
                0,
            ),
            (RelationshipState::PendingReceived, FriendAction::Accept) => (
                RelationshipState::Friends,
                EdgeEffect::Accept {
                    requester: subject,
                    target: viewer,
                },
                1,
            ),
            (RelationshipState::PendingReceived, FriendAction::Decline) => (
                RelationshipState::None,
                EdgeEffect::Delete {
                    requester: subject,
                    target: viewer,
                },
                0,
            ),
            (RelationshipState::PendingSent, FriendAction::Cancel | FriendAction::Unfriend) => (
                RelationshipState::None,
                EdgeEffect::Delete {
                    requester: viewer,
                    target: subject,
                },
                0,
            ),
            (RelationshipState::Friends, FriendAction::Unfriend) => (
                RelationshipState::None,
                EdgeEffect::DeleteBetween {
                    a: viewer,
                    b: subject,
                },
                -1,
            ),
            (state, action) => return Err(Error::InvalidTransition { state, action }),
        };
        Ok(Transition {
            action,
            from: self,
            to,
            effect,
            count_delta,
        })
    }
}
