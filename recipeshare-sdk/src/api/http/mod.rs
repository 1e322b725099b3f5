use std::rc::Rc;

use async_trait::async_trait;
use gloo_net::http::{Request, RequestBuilder, Response};

pub use relationship::*;
pub use user::*;

use crate::config::ApiConfig;
use crate::error::{api_err, Error, Result};
use crate::model::friendship::EdgeFilter;

mod relationship;
mod user;

pub const AUTHORIZE_HEADER: &str = "Authorization";
pub const APIKEY_HEADER: &str = "apikey";
pub const PREFER_HEADER: &str = "Prefer";
pub const RETURN_REPRESENTATION: &str = "return=representation";
pub const COUNT_EXACT: &str = "count=exact";

#[async_trait(?Send)]
pub trait RespStatus: Sized {
    async fn success(self) -> Result<Self>;
}

#[async_trait(?Send)]
impl RespStatus for Response {
    async fn success(self) -> Result<Self> {
        if (200..=299).contains(&self.status()) {
            Ok(self)
        } else {
            let status = self.status();
            // deserialize error
            let body = self
                .json::<api_err::PostgrestBody>()
                .await
                .unwrap_or_default();
            log::debug!("rest call failed with {status}: {:?}", body);
            Err(Error::from(api_err::Error::from_response(status, body)))
        }
    }
}

type TokenFn = dyn Fn() -> Option<String>;

/// Shared base of the table clients: where to send requests and how to
/// authenticate them.
#[derive(Clone)]
pub struct RestClient {
    config: ApiConfig,
    token: Rc<TokenFn>,
}

impl RestClient {
    /// `token` yields the signed-in user's JWT, if any.
    pub fn new(config: ApiConfig, token: impl Fn() -> Option<String> + 'static) -> Self {
        Self {
            config,
            token: Rc::new(token),
        }
    }

    pub fn anonymous(config: ApiConfig) -> Self {
        Self::new(config, || None)
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn bearer(&self) -> String {
        let token = (self.token)().unwrap_or_else(|| self.config.anon_key.clone());
        format!("Bearer {}", token)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(APIKEY_HEADER, &self.config.anon_key)
            .header(AUTHORIZE_HEADER, &self.bearer())
    }

    pub fn get(&self, table: &str) -> RequestBuilder {
        self.authorize(Request::get(&self.config.table_url(table)))
    }

    pub fn post(&self, table: &str) -> RequestBuilder {
        self.authorize(Request::post(&self.config.table_url(table)))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
    }

    pub fn patch(&self, table: &str) -> RequestBuilder {
        self.authorize(Request::patch(&self.config.table_url(table)))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
    }

    pub fn delete(&self, table: &str) -> RequestBuilder {
        self.authorize(Request::delete(&self.config.table_url(table)))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
    }
}

/// `column=eq.value`
pub fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Double-quote a value for use inside `or=(...)` and `in.(...)`, where
/// commas and parentheses are syntax.
pub fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// `id=in.("a","b")`
pub fn in_list(values: &[String]) -> String {
    let quoted = values
        .iter()
        .map(|value| quote(value))
        .collect::<Vec<_>>()
        .join(",");
    format!("in.({})", quoted)
}

/// `or=` value matching the edge between `a` and `b` in both directions.
pub fn either_direction(a: &str, b: &str) -> String {
    let (a, b) = (quote(a), quote(b));
    format!(
        "(and(user_id.eq.{a},friend_id.eq.{b}),and(user_id.eq.{b},friend_id.eq.{a}))"
    )
}

pub fn edge_query(filter: &EdgeFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(3);
    if let Some(requester) = &filter.requester {
        query.push(("user_id", eq(requester)));
    }
    if let Some(target) = &filter.target {
        query.push(("friend_id", eq(target)));
    }
    if let Some(status) = filter.status {
        query.push(("status", eq(status.as_str())));
    }
    query
}

/// Total from a `Content-Range` header: `0-24/310` or `*/0`.
pub fn parse_content_range(header: &str) -> Result<usize> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
        .ok_or_else(|| Error::Convert(format!("unexpected content-range: {header}")))
}
