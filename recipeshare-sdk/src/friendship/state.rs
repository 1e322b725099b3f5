use crate::error::{Error, Result};
use crate::model::friendship::{
    EdgeEffect, EdgeStatus, FriendAction, NewFriendship, Pair, RelationshipState, Transition,
};

use super::FriendshipService;

impl<'a> FriendshipService<'a> {
    pub async fn derive_state(&self, pair: &Pair) -> Result<RelationshipState> {
        let sent = self.store.find_edge(&pair.viewer, &pair.subject).await?;
        if sent.is_some() {
            return Ok(RelationshipState::from_edges(sent.as_ref(), None));
        }
        let received = self.store.find_edge(&pair.subject, &pair.viewer).await?;
        Ok(RelationshipState::from_edges(None, received.as_ref()))
    }

    /// Validate `action` against the state the caller believes in and
    /// perform the write. The state is not re-read first.
    pub async fn apply(
        &self,
        pair: &Pair,
        state: RelationshipState,
        action: FriendAction,
    ) -> Result<Transition> {
        let transition = state.plan(pair, action)?;
        self.execute(&transition).await?;
        log::debug!(
            "{} -> {}: {} ({} => {})",
            pair.viewer,
            pair.subject,
            action,
            transition.from,
            transition.to
        );
        Ok(transition)
    }

    /// Read the current state from the store, then apply `action` to it.
    pub async fn perform(&self, pair: &Pair, action: FriendAction) -> Result<Transition> {
        let state = self.derive_state(pair).await?;
        self.apply(pair, state, action).await
    }

    pub async fn execute(&self, transition: &Transition) -> Result<()> {
        match &transition.effect {
            EdgeEffect::Create { requester, target } => {
                self.store
                    .create_edge(NewFriendship::request(requester.clone(), target.clone()))
                    .await?;
            }
            EdgeEffect::Accept { requester, target } => {
                self.store
                    .update_edge_status(
                        requester,
                        target,
                        EdgeStatus::Pending,
                        EdgeStatus::Accepted,
                    )
                    .await?;
            }
            EdgeEffect::Delete { requester, target } => {
                let deleted = self
                    .store
                    .delete_edge(requester, target, EdgeStatus::Pending)
                    .await?;
                if deleted == 0 {
                    return Err(Error::not_found(format!(
                        "no request from {requester} to {target}"
                    )));
                }
            }
            EdgeEffect::DeleteBetween { a, b } => {
                let deleted = self
                    .store
                    .delete_between(a, b, EdgeStatus::Accepted)
                    .await?;
                if deleted == 0 {
                    return Err(Error::not_found(format!("no friendship between {a} and {b}")));
                }
            }
        }
        Ok(())
    }
}
