use crate::{
    error::Result,
    model::friendship::{EdgeFilter, EdgeStatus, FriendshipEdge, NewFriendship},
};

/// The `friendships` table, one directed row per request.
#[async_trait::async_trait(?Send)]
pub trait RelationshipStore {
    /// Fails with `Error::Conflict` when the directed edge already exists.
    async fn create_edge(&self, edge: NewFriendship) -> Result<FriendshipEdge>;

    /// Moves `requester -> target` from `from` to `to`. Only a row still in
    /// `from` is touched; otherwise `Error::NotFound`.
    async fn update_edge_status(
        &self,
        requester_id: &str,
        target_id: &str,
        from: EdgeStatus,
        to: EdgeStatus,
    ) -> Result<FriendshipEdge>;

    /// Deletes `requester -> target` only while it is in `status`. Returns
    /// how many rows went away; zero is not an error here.
    async fn delete_edge(
        &self,
        requester_id: &str,
        target_id: &str,
        status: EdgeStatus,
    ) -> Result<usize>;

    /// Deletes the edge between `a` and `b` whichever way it points, only
    /// while it is in `status`.
    async fn delete_between(&self, a: &str, b: &str, status: EdgeStatus) -> Result<usize>;

    async fn find_edge(&self, requester_id: &str, target_id: &str)
        -> Result<Option<FriendshipEdge>>;

    async fn list_edges(&self, filter: &EdgeFilter) -> Result<Vec<FriendshipEdge>>;

    async fn count_edges(&self, filter: &EdgeFilter) -> Result<usize>;
}
