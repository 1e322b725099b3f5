use yew::AttrValue;
use yewdux::{Dispatch, Store};

use crate::error::Error;
use crate::model::friendship::FriendAction;

#[derive(Default, Debug, Clone, PartialEq, Store)]
pub struct Notification {
    pub id: i64,
    pub content: AttrValue,
    pub delay: u32,
    pub type_: NotificationType,
    pub error: Option<Error>,
}

impl Notification {
    pub fn info(content: impl ToString) -> Self {
        let id = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            content: content.to_string().into(),
            type_: NotificationType::Info,
            delay: 3000,
            error: None,
        }
    }

    pub fn warn(content: impl ToString) -> Self {
        let id = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            content: content.to_string().into(),
            type_: NotificationType::Warn,
            delay: 3000,
            error: None,
        }
    }

    pub fn error(err: Error) -> Self {
        let id = chrono::Utc::now().timestamp_millis();
        Self {
            id,
            content: AttrValue::default(),
            type_: NotificationType::Error,
            delay: 5000,
            error: Some(err),
        }
    }

    /// Turn a failed friendship action into what the user sees.
    pub fn from_error(action: FriendAction, err: Error) -> Self {
        match &err {
            Error::Conflict(_) => Self::info("A friend request between you already exists."),
            Error::Unauthenticated => Self::warn("Please sign in to manage friends."),
            Error::InProgress => Self::warn("Still working on your last request."),
            _ => {
                let content = match action {
                    FriendAction::Accept => "Failed to accept request. Please try again.",
                    FriendAction::Decline => "Failed to decline request. Please try again.",
                    _ => "Failed to update friendship. Please try again.",
                };
                let mut noti = Self::error(err);
                noti.content = content.into();
                noti
            }
        }
    }

    /// Confirmation for inbox actions.
    pub fn done(action: FriendAction) -> Option<Self> {
        match action {
            FriendAction::Accept => Some(Self::info("Friend request accepted!")),
            FriendAction::Decline => Some(Self::info("Friend request declined.")),
            _ => None,
        }
    }

    pub fn notify_to(self, dispatch: &Dispatch<Notification>) {
        dispatch.set(self);
    }

    pub fn with_delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default, Clone, Debug, PartialEq)]
pub enum NotificationType {
    #[default]
    Info,
    Warn,
    Error,
}
