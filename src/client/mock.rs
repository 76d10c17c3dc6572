//! Mock admin API transport for testing
//!
//! Scripted responses per route, with captured requests and call counts
//! for assertions.

use async_trait::async_trait;
use reqwest::Method;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{AdminTransport, ApiRequest, ApiResponse};
use crate::error::{ApiError, Result};

type Route = (Method, String);

/// Normalize a request path for routing: no leading slash, no query string
pub fn normalize_path(path: &str) -> &str {
    let path = path.trim_start_matches('/');
    match path.find('?') {
        Some(idx) => &path[..idx],
        None => path,
    }
}

/// Mock transport.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new()
///     .respond(Method::GET, "api/_info/version", 200, "{}")
///     .await;
/// ```
#[derive(Default)]
pub struct MockTransport {
    /// Queued responses per route; the last one repeats
    routes: Arc<Mutex<HashMap<Route, VecDeque<ApiResponse>>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Every request seen, in order
    captured_requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for a route
    pub async fn respond(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        {
            let mut routes = self.routes.lock().await;
            routes
                .entry((method, normalize_path(path).to_string()))
                .or_default()
                .push_back(ApiResponse {
                    status,
                    content_type: Some("application/json".to_string()),
                    body: body.to_string(),
                });
        }
        self
    }

    /// Configure an error to return on the next call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// All captured requests
    pub async fn captured_requests(&self) -> Vec<ApiRequest> {
        self.captured_requests.lock().await.clone()
    }

    /// Number of calls to a route
    pub async fn count(&self, method: Method, path: &str) -> usize {
        let path = normalize_path(path);
        self.captured_requests
            .lock()
            .await
            .iter()
            .filter(|r| r.method == method && normalize_path(&r.path) == path)
            .count()
    }
}

#[async_trait]
impl AdminTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.captured_requests.lock().await.push(request.clone());

        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }

        let key = (request.method.clone(), normalize_path(&request.path).to_string());
        let mut routes = self.routes.lock().await;
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        Ok(response.unwrap_or_else(|| ApiResponse {
            status: 404,
            content_type: None,
            body: format!("no mock route for {} {}", key.0, key.1),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_repeat_last() {
        let mock = MockTransport::new()
            .respond(Method::GET, "/api/x", 500, "")
            .await
            .respond(Method::GET, "api/x", 200, "ok")
            .await;

        let first = mock
            .execute(ApiRequest::new(Method::GET, "api/x"))
            .await
            .unwrap();
        let second = mock
            .execute(ApiRequest::new(Method::GET, "api/x"))
            .await
            .unwrap();
        let third = mock
            .execute(ApiRequest::new(Method::GET, "/api/x"))
            .await
            .unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.body, "ok");
        assert_eq!(third.body, "ok");
        assert_eq!(mock.count(Method::GET, "api/x").await, 3);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/api/product"), "api/product");
        assert_eq!(normalize_path("api/product?response=true"), "api/product");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let mock = MockTransport::new();
        let response = mock
            .execute(ApiRequest::new(Method::DELETE, "api/nope"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_error_consumed_once() {
        let mock = MockTransport::new()
            .with_error(ApiError::Network("down".into()))
            .await;

        assert!(mock.execute(ApiRequest::new(Method::GET, "a")).await.is_err());
        assert!(mock.execute(ApiRequest::new(Method::GET, "a")).await.is_ok());
    }
}
