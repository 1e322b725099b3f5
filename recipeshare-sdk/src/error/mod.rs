use thiserror::Error as ThisError;

use crate::model::friendship::{FriendAction, RelationshipState};

pub mod api_err;

pub type Reason = String;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    /// a row with the same unique key already exists
    #[error("conflict: {0}")]
    Conflict(Reason),
    /// nothing matched the query or the conditional write
    #[error("not found: {0}")]
    NotFound(Reason),
    /// the store refused our credentials
    #[error("unauthorized: {0}")]
    Unauthorized(Reason),
    /// request server error
    #[error("server error: {0}")]
    Network(api_err::Error),
    /// the request never produced a response
    #[error("request error: {0}")]
    Request(Reason),
    /// convert server message to local type
    #[error("convert error: {0}")]
    Convert(Reason),
    #[error("configuration error: {0}")]
    Config(Reason),
    #[error("cannot {action} while relationship is {state}")]
    InvalidTransition {
        state: RelationshipState,
        action: FriendAction,
    },
    #[error("a user has no relationship with themselves")]
    SelfRelationship,
    #[error("sign in required")]
    Unauthenticated,
    #[error("another friendship action is still in progress")]
    InProgress,
}

impl Error {
    pub fn not_found(reason: impl Into<Reason>) -> Self {
        Self::NotFound(reason.into())
    }

    pub fn conflict(reason: impl Into<Reason>) -> Self {
        Self::Conflict(reason.into())
    }

    /// Whether the failure is one the user can shrug off: the store already
    /// holds what they asked for.
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }
}

impl From<gloo_net::Error> for Error {
    fn from(value: gloo_net::Error) -> Self {
        match value {
            gloo_net::Error::SerdeError(err) => Error::Convert(err.to_string()),
            err => Error::Request(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Convert(value.to_string())
    }
}

impl From<api_err::Error> for Error {
    fn from(value: api_err::Error) -> Self {
        use api_err::ErrorKind;

        let reason = value.to_string();
        match value.kind().clone() {
            ErrorKind::UniqueViolation => Error::Conflict(reason),
            ErrorKind::NotFound => Error::NotFound(reason),
            ErrorKind::UnAuthorized => Error::Unauthorized(reason),
            _ => Error::Network(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_map_to_taxonomy() {
        let err: Error = api_err::Error::new(api_err::ErrorKind::UniqueViolation, None).into();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(err.is_benign());

        let err: Error = api_err::Error::new(api_err::ErrorKind::NotFound, None).into();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(!err.is_benign());

        let err: Error = api_err::Error::unknown_error().into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn invalid_transition_reads_naturally() {
        let err = Error::InvalidTransition {
            state: RelationshipState::Friends,
            action: FriendAction::Accept,
        };
        assert_eq!(err.to_string(), "cannot accept while relationship is friends");
    }
}
