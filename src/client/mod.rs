//! HTTP plumbing for the admin API
//!
//! Everything above this layer talks to an [`AdminTransport`], which sends
//! one request and hands back the status and raw body. Status handling is
//! left to the caller: the token probe treats any status as an answer,
//! while resource calls fail on anything but success.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpTransport;
#[cfg(test)]
pub use mock::MockTransport;

/// Media type of the admin API's JSON:API responses
pub const JSON_API: &str = "application/vnd.api+json";

/// A single admin API request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `api/product/123`
    pub path: String,
    pub bearer: Option<String>,
    pub accept: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            accept: None,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept = Some(media_type.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and raw body of a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends admin API requests
#[async_trait]
pub trait AdminTransport: Send + Sync {
    /// Send a request. Only transport failures are errors; any HTTP status
    /// comes back as a response.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse>;
}
