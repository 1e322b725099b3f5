use crate::error::Result;
use crate::model::friendship::{EdgeFilter, EdgeStatus};

use super::FriendshipService;

impl<'a> FriendshipService<'a> {
    /// Accepted friendships of `user_id` in either direction. Recomputed on
    /// every call.
    pub async fn friends_count(&self, user_id: &str) -> Result<usize> {
        let sent = self
            .store
            .count_edges(&accepted().requested_by(user_id.to_string()))
            .await?;
        let received = self
            .store
            .count_edges(&accepted().targeting(user_id.to_string()))
            .await?;
        Ok(sent + received)
    }

    /// Counterparts of every accepted edge touching `user_id`; requests the
    /// user sent come first.
    pub async fn friend_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let sent = self
            .store
            .list_edges(&accepted().requested_by(user_id.to_string()))
            .await?;
        let received = self
            .store
            .list_edges(&accepted().targeting(user_id.to_string()))
            .await?;
        let mut ids: Vec<String> = Vec::with_capacity(sent.len() + received.len());
        for edge in sent.iter().chain(received.iter()) {
            let id = edge.counterpart(user_id).to_string();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Users with a pending request waiting on `user_id`.
    pub async fn requester_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let filter = EdgeFilter::default()
            .targeting(user_id.to_string())
            .with_status(EdgeStatus::Pending);
        Ok(self
            .store
            .list_edges(&filter)
            .await?
            .into_iter()
            .map(|edge| edge.requester_id.to_string())
            .collect())
    }
}

fn accepted() -> EdgeFilter {
    EdgeFilter::default().with_status(EdgeStatus::Accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryStore, RelationshipStore};
    use crate::model::friendship::NewFriendship;

    async fn befriend(store: &MemoryStore, requester: &'static str, target: &'static str) {
        store
            .create_edge(NewFriendship::request(requester.into(), target.into()))
            .await
            .unwrap();
        store
            .update_edge_status(requester, target, EdgeStatus::Pending, EdgeStatus::Accepted)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn count_unions_both_directions() {
        let store = MemoryStore::new();
        befriend(&store, "u", "a").await;
        befriend(&store, "b", "u").await;
        befriend(&store, "a", "b").await;
        // pending rows do not count
        store
            .create_edge(NewFriendship::request("c".into(), "u".into()))
            .await
            .unwrap();

        let service = FriendshipService::new(&store);
        assert_eq!(service.friends_count("u").await.unwrap(), 2);
        assert_eq!(service.friends_count("a").await.unwrap(), 2);
        assert_eq!(service.friends_count("c").await.unwrap(), 0);
        assert_eq!(
            service.friend_ids("u").await.unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(service.requester_ids("u").await.unwrap(), vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn friend_ids_never_repeat_a_counterpart() {
        let store = MemoryStore::new();
        // both directions present, which normal operation never produces
        befriend(&store, "u", "a").await;
        befriend(&store, "a", "u").await;
        let service = FriendshipService::new(&store);
        assert_eq!(service.friend_ids("u").await.unwrap(), vec!["a".to_string()]);
    }
}
