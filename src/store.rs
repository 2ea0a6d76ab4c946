use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE};
use serde_json::Value;
use thiserror::Error;

use crate::config::RemoteConfig;
use crate::http_client::build_http_client;
use crate::postgrest::{Query, parse_content_range};
use crate::records::{Column, MatchRecord};
use crate::retry::Reconnect;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("missing or malformed content-range: {0}")]
    BadContentRange(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl QueryError {
    /// Connection-level failures worth a reconnect and another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            QueryError::Transport(err) => {
                err.is_connect() || err.is_timeout() || err.is_request() || err.is_body()
            }
            QueryError::Status { status, .. } => matches!(status.as_u16(), 502..=504),
            QueryError::Unavailable(_) => true,
            QueryError::Decode(_) | QueryError::BadContentRange(_) => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowsPage {
    pub rows: Vec<MatchRecord>,
    /// Exact filtered count, when the backend reported one.
    pub total: Option<u64>,
}

/// Read-only access to the odds table.
pub trait MatchStore: Reconnect {
    fn select_rows(&self, query: &Query) -> Result<RowsPage, QueryError>;

    fn count(&self, query: &Query) -> Result<u64, QueryError>;

    /// Raw text values of one column over a row window, in storage order.
    fn select_column(
        &self,
        column: Column,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Option<String>>, QueryError>;
}

pub struct SupabaseStore {
    cfg: RemoteConfig,
    client: Client,
}

impl SupabaseStore {
    pub fn connect(cfg: RemoteConfig) -> Result<Self, QueryError> {
        let client = build_http_client(cfg.timeout)?;
        Ok(Self { cfg, client })
    }

    fn request(&self, method: reqwest::Method, query: &Query) -> RequestBuilder {
        self.client
            .request(method, self.cfg.table_url())
            .query(&query.to_params())
            .header("apikey", &self.cfg.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.cfg.api_key))
            .header(ACCEPT, "application/json")
    }
}

impl Reconnect for SupabaseStore {
    fn reconnect(&mut self) -> Result<(), QueryError> {
        self.client = build_http_client(self.cfg.timeout)?;
        Ok(())
    }
}

impl MatchStore for SupabaseStore {
    fn select_rows(&self, query: &Query) -> Result<RowsPage, QueryError> {
        let resp = self
            .request(reqwest::Method::GET, query)
            .header("Prefer", "count=exact")
            .send()?;
        let status = resp.status();
        let total = content_range_total(&resp);

        // Offsets past the end are answered with 416 plus the real count.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(RowsPage {
                rows: Vec::new(),
                total,
            });
        }
        let body = checked_body(resp)?;
        let rows = serde_json::from_str::<Vec<MatchRecord>>(&body)?;
        Ok(RowsPage { rows, total })
    }

    fn count(&self, query: &Query) -> Result<u64, QueryError> {
        let resp = self
            .request(reqwest::Method::HEAD, query)
            .header("Prefer", "count=exact")
            .send()?;
        let status = resp.status();
        if !status.is_success() && status != StatusCode::RANGE_NOT_SATISFIABLE {
            return Err(QueryError::Status {
                status,
                body: String::new(),
            });
        }
        content_range_total(&resp).ok_or_else(|| {
            let raw = resp
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("<absent>");
            QueryError::BadContentRange(raw.to_string())
        })
    }

    fn select_column(
        &self,
        column: Column,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Option<String>>, QueryError> {
        let query = Query::select(column.name()).window(offset, limit);
        let resp = self.request(reqwest::Method::GET, &query).send()?;
        if resp.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(Vec::new());
        }
        let body = checked_body(resp)?;
        let items = serde_json::from_str::<Vec<Value>>(&body)?;
        Ok(items
            .iter()
            .map(|item| match item.get(column.name()) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .collect())
    }
}

fn content_range_total(resp: &Response) -> Option<u64> {
    resp.headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
        .flatten()
}

fn checked_body(resp: Response) -> Result<String, QueryError> {
    let status = resp.status();
    let body = resp.text()?;
    if !status.is_success() {
        return Err(QueryError::Status { status, body });
    }
    Ok(body)
}
