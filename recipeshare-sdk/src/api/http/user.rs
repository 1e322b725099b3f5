use crate::api::user::UserApi;
use crate::error::{Error, Result};
use crate::model::user::{NewUser, ProfileUpdate, User};

use super::{eq, in_list, RespStatus, RestClient};

pub const USER_TABLE_NAME: &str = "users";

pub struct UserHttp {
    client: RestClient,
}

impl UserHttp {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait(?Send)]
impl UserApi for UserHttp {
    async fn get_user(&self, id: &str) -> Result<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user {id}")))
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let users = self
            .client
            .get(USER_TABLE_NAME)
            .query([("select", "*".to_string()), ("id", in_list(ids))])
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        Ok(users)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>> {
        let mut users: Vec<User> = self
            .client
            .get(USER_TABLE_NAME)
            .query([("select", "*".to_string()), ("id", eq(id))])
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        Ok(users.pop())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        log::debug!("create user {}", user.id);
        let mut users: Vec<User> = self
            .client
            .post(USER_TABLE_NAME)
            .json(&user)?
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        users
            .pop()
            .ok_or_else(|| Error::Convert("insert returned no row".to_string()))
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User> {
        let mut users: Vec<User> = self
            .client
            .patch(USER_TABLE_NAME)
            .query([("id", eq(id))])
            .json(&update)?
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        users
            .pop()
            .ok_or_else(|| Error::not_found(format!("user {id}")))
    }
}
