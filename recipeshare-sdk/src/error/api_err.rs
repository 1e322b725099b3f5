use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// Postgres error code for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";
/// PostgREST: a single row was requested but zero (or many) came back.
const PGRST_SINGULAR: &str = "PGRST116";
/// PostgREST: the JWT was missing or rejected.
const PGRST_JWT: &str = "PGRST301";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ErrorKind {
    UnknownError,
    UniqueViolation,
    NotFound,
    UnAuthorized,
    BadRequest,
    InternalServer,
}

impl ErrorKind {
    pub fn classify(status: u16, code: Option<&str>) -> Self {
        match (status, code) {
            (_, Some(PG_UNIQUE_VIOLATION)) | (409, _) => ErrorKind::UniqueViolation,
            (_, Some(PGRST_SINGULAR)) | (404, _) | (406, _) => ErrorKind::NotFound,
            (_, Some(PGRST_JWT)) | (401, _) | (403, _) => ErrorKind::UnAuthorized,
            (400..=499, _) => ErrorKind::BadRequest,
            (500..=599, _) => ErrorKind::InternalServer,
            _ => ErrorKind::UnknownError,
        }
    }
}

/// The body PostgREST sends back with a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostgrestBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    details: Option<String>,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl Error {
    pub fn new(kind: ErrorKind, details: Option<String>) -> Self {
        Error { kind, details }
    }

    pub fn unknown_error() -> Self {
        Error {
            kind: ErrorKind::UnknownError,
            details: None,
        }
    }

    pub fn from_response(status: u16, body: PostgrestBody) -> Self {
        let kind = ErrorKind::classify(status, body.code.as_deref());
        let details = match (body.message, body.details) {
            (Some(message), Some(details)) => Some(format!("{message} ({details})")),
            (Some(message), None) => Some(message),
            (None, details) => details,
        };
        Error { kind, details }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}
