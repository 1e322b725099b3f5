use crate::config::config;
use crate::error::Result;

pub use self::{
    http::{RelationshipHttp, RestClient, UserHttp},
    memory::MemoryStore,
    relationship::RelationshipStore,
    user::UserApi,
};

pub mod http;
mod memory;
mod relationship;
mod user;

/// Client for the globally configured API, authenticated by `token`.
pub fn rest_client(token: impl Fn() -> Option<String> + 'static) -> Result<RestClient> {
    Ok(RestClient::new(config()?.clone(), token))
}

pub fn relationships(client: RestClient) -> Box<dyn RelationshipStore> {
    Box::new(RelationshipHttp::new(client))
}

pub fn users(client: RestClient) -> Box<dyn UserApi> {
    Box::new(UserHttp::new(client))
}
