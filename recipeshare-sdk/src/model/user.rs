use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yew::AttrValue;

/// A row of the `users` table. `id` is the auth provider's subject.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct User {
    pub id: AttrValue,
    #[serde(default)]
    pub email: AttrValue,
    #[serde(default)]
    pub name: AttrValue,
    #[serde(default)]
    pub avatar_url: Option<AttrValue>,
    #[serde(default)]
    pub bio: Option<AttrValue>,
    #[serde(default)]
    pub location: Option<AttrValue>,
    #[serde(default)]
    pub website: Option<AttrValue>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// What the auth provider tells us about the signed-in user.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct Identity {
    pub sub: AttrValue,
    #[serde(default)]
    pub name: AttrValue,
    #[serde(default)]
    pub email: AttrValue,
    #[serde(default)]
    pub picture: Option<AttrValue>,
}

/// Insert body used the first time a user signs in.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: AttrValue,
    pub email: AttrValue,
    pub name: AttrValue,
    pub avatar_url: Option<AttrValue>,
}

impl From<&Identity> for NewUser {
    fn from(value: &Identity) -> Self {
        Self {
            id: value.sub.clone(),
            email: value.email.clone(),
            name: value.name.clone(),
            avatar_url: value.picture.clone(),
        }
    }
}

impl From<NewUser> for User {
    fn from(value: NewUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            avatar_url: value.avatar_url,
            ..Default::default()
        }
    }
}

/// The editable part of a profile. Empty strings are sent as-is, which
/// clears the column.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub bio: AttrValue,
    pub location: AttrValue,
    pub website: AttrValue,
}

impl ProfileUpdate {
    pub fn apply_to(&self, user: &mut User) {
        user.bio = Some(self.bio.clone());
        user.location = Some(self.location.clone());
        user.website = Some(self.website.clone());
    }
}
