use crate::api::relationship::RelationshipStore;
use crate::error::{Error, Result};
use crate::model::friendship::{
    EdgeFilter, EdgeStatus, FriendshipEdge, NewFriendship, StatusUpdate,
};

use super::{
    edge_query, either_direction, eq, parse_content_range, RespStatus, RestClient, COUNT_EXACT,
    PREFER_HEADER,
};

pub const FRIENDSHIP_TABLE_NAME: &str = "friendships";

pub struct RelationshipHttp {
    client: RestClient,
}

impl RelationshipHttp {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait(?Send)]
impl RelationshipStore for RelationshipHttp {
    async fn create_edge(&self, edge: NewFriendship) -> Result<FriendshipEdge> {
        let mut rows: Vec<FriendshipEdge> = self
            .client
            .post(FRIENDSHIP_TABLE_NAME)
            .json(&edge)?
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        rows.pop()
            .ok_or_else(|| Error::Convert("insert returned no row".to_string()))
    }

    async fn update_edge_status(
        &self,
        requester_id: &str,
        target_id: &str,
        from: EdgeStatus,
        to: EdgeStatus,
    ) -> Result<FriendshipEdge> {
        let mut rows: Vec<FriendshipEdge> = self
            .client
            .patch(FRIENDSHIP_TABLE_NAME)
            .query([
                ("user_id", eq(requester_id)),
                ("friend_id", eq(target_id)),
                ("status", eq(from.as_str())),
            ])
            .json(&StatusUpdate { status: to })?
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        // zero rows: the request was withdrawn or already answered
        rows.pop().ok_or_else(|| {
            Error::not_found(format!("no {from} request from {requester_id} to {target_id}"))
        })
    }

    async fn delete_edge(
        &self,
        requester_id: &str,
        target_id: &str,
        status: EdgeStatus,
    ) -> Result<usize> {
        let rows: Vec<FriendshipEdge> = self
            .client
            .delete(FRIENDSHIP_TABLE_NAME)
            .query([
                ("user_id", eq(requester_id)),
                ("friend_id", eq(target_id)),
                ("status", eq(status.as_str())),
            ])
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        Ok(rows.len())
    }

    async fn delete_between(&self, a: &str, b: &str, status: EdgeStatus) -> Result<usize> {
        let rows: Vec<FriendshipEdge> = self
            .client
            .delete(FRIENDSHIP_TABLE_NAME)
            .query([("or", either_direction(a, b)), ("status", eq(status.as_str()))])
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        Ok(rows.len())
    }

    async fn find_edge(
        &self,
        requester_id: &str,
        target_id: &str,
    ) -> Result<Option<FriendshipEdge>> {
        let filter = EdgeFilter::default()
            .requested_by(requester_id.to_string())
            .targeting(target_id.to_string());
        let mut rows = self.list_edges(&filter).await?;
        Ok(rows.pop())
    }

    async fn list_edges(&self, filter: &EdgeFilter) -> Result<Vec<FriendshipEdge>> {
        let mut query = edge_query(filter);
        query.push(("select", "*".to_string()));
        let rows = self
            .client
            .get(FRIENDSHIP_TABLE_NAME)
            .query(query)
            .send()
            .await?
            .success()
            .await?
            .json()
            .await?;
        Ok(rows)
    }

    async fn count_edges(&self, filter: &EdgeFilter) -> Result<usize> {
        let mut query = edge_query(filter);
        query.push(("select", "id".to_string()));
        let resp = self
            .client
            .get(FRIENDSHIP_TABLE_NAME)
            .header(PREFER_HEADER, COUNT_EXACT)
            .header("Range-Unit", "items")
            .header("Range", "0-0")
            .query(query)
            .send()
            .await?
            .success()
            .await?;
        let range = resp
            .headers()
            .get("content-range")
            .ok_or_else(|| Error::Convert("count response without content-range".to_string()))?;
        parse_content_range(&range)
    }
}
