use crate::{
    error::Result,
    model::user::{NewUser, ProfileUpdate, User},
};

#[async_trait::async_trait(?Send)]
pub trait UserApi {
    async fn get_user(&self, id: &str) -> Result<User>;

    /// Missing ids are skipped, order follows the store.
    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>>;

    async fn find_user(&self, id: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> Result<User>;
}
