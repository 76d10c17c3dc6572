//! reqwest-backed admin API transport

use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client as HttpClient;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::{AdminTransport, ApiRequest, ApiResponse};
use crate::config::Settings;
use crate::error::{ApiError, Result};

/// Upper bound on requests per second against a dev server
const RATE_LIMIT_PER_SECOND: NonZeroU32 = NonZeroU32::new(20).unwrap();

/// Admin API transport over HTTP
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl HttpTransport {
    /// Create a transport for the configured base URL and timeout
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            RATE_LIMIT_PER_SECOND,
        )));

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Resolve a request path against the base URL.
    ///
    /// Absolute URLs pass through untouched.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AdminTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.rate_limiter.until_ready().await;

        let url = self.url_for(&request.path);
        log::debug!("{} {}", request.method, url);

        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(ref token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref accept) = request.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = builder.send().await.map_err(ApiError::from)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to read response body: {}", e))
        })?;

        log::debug!("{} {} -> {}", request.method, url, status);

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}
