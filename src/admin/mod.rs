//! Admin API helpers used to seed and clean up test state
//!
//! Each helper authenticates first and then makes one resource call.
//! Responses go through a single decode step into [`AdminPayload`].

use std::sync::Arc;

use reqwest::Method;
use serde_json::{Value, json};

use crate::auth::Authenticator;
use crate::client::{AdminTransport, ApiRequest, ApiResponse, JSON_API};
use crate::config::Settings;
use crate::error::{ApiError, Result, SessionError};
use crate::session::{Cookie, Session, Token};

/// Decoded admin API response
#[derive(Debug, Clone, PartialEq)]
pub enum AdminPayload {
    /// `data` held zero or one entity, or was not a list
    Record(Option<Value>),
    /// `data` held more than one entity
    Records(Vec<Value>),
    /// Empty body; the response is passed through
    Raw(ApiResponse),
}

impl AdminPayload {
    /// Decode a successful response.
    ///
    /// A `data` list of length one collapses to that element and an empty
    /// list to `Record(None)`.
    pub fn decode(response: ApiResponse) -> Result<Self> {
        if response.body.trim().is_empty() {
            return Ok(AdminPayload::Raw(response));
        }

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Expected JSON body (status {}): {}",
                response.status, e
            ))
        })?;

        let payload = match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(items)) if items.len() <= 1 => {
                    AdminPayload::Record(items.into_iter().next())
                }
                Some(Value::Array(items)) => AdminPayload::Records(items),
                Some(Value::Null) | None => AdminPayload::Record(None),
                Some(other) => AdminPayload::Record(Some(other)),
            },
            _ => AdminPayload::Record(None),
        };
        Ok(payload)
    }

    /// Flatten into a JSON value for output
    pub fn into_value(self) -> Value {
        match self {
            AdminPayload::Record(Some(v)) => v,
            AdminPayload::Record(None) => Value::Null,
            AdminPayload::Records(items) => Value::Array(items),
            AdminPayload::Raw(response) => json!({
                "status": response.status,
                "body": response.body,
            }),
        }
    }
}

/// Authenticated admin API helpers
pub struct AdminApi {
    transport: Arc<dyn AdminTransport>,
    auth: Authenticator,
}

impl AdminApi {
    pub fn new(transport: Arc<dyn AdminTransport>, session: Session, settings: &Settings) -> Self {
        let auth = Authenticator::new(Arc::clone(&transport), session, settings);
        Self { transport, auth }
    }

    /// Valid bearer token for the admin user
    pub async fn authenticate(&self) -> Result<Token> {
        self.auth.authenticate().await
    }

    /// Authenticate and keep the token cookie for the rest of the session.
    ///
    /// Returns the stored cookie as read back from the session.
    pub async fn login(&self) -> Result<Cookie> {
        let token = self.auth.authenticate().await?;
        let session = self.auth.session();
        session.store_token(&token, None)?;

        let cookie = session
            .token_cookie()?
            .ok_or_else(|| SessionError::Io("token cookie missing after login".to_string()))?;
        Ok(cookie)
    }

    /// Equality search on one field of an entity
    pub async fn search(&self, endpoint: &str, field: &str, value: &str) -> Result<Vec<Value>> {
        let token = self.auth.authenticate().await?;

        let body = json!({
            "filter": [{ "field": field, "type": "equals", "value": value }]
        });
        let response = self
            .transport
            .execute(
                ApiRequest::new(Method::POST, format!("api/search/{}", endpoint))
                    .bearer(token.access)
                    .accept(JSON_API)
                    .query("response", "true")
                    .json(body),
            )
            .await?;
        let response = ensure_success(response)?;

        let body: Value = serde_json::from_str(&response.body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse search response: {}", e))
        })?;

        match body.get("data") {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(ApiError::InvalidResponse(
                "search response 'data' is not a list".to_string(),
            )
            .into()),
        }
    }

    /// Authenticated JSON:API request with response normalization
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<AdminPayload> {
        let token = self.auth.authenticate().await?;

        let mut request = ApiRequest::new(method, url)
            .bearer(token.access)
            .accept(JSON_API)
            .query("response", "true");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.transport.execute(request).await?;
        AdminPayload::decode(ensure_success(response)?)
    }

    /// PATCH an entity by id
    pub async fn update(&self, endpoint: &str, id: &str, data: Value) -> Result<AdminPayload> {
        self.request(Method::PATCH, &format!("api/{}/{}", endpoint, id), Some(data))
            .await
    }

    /// Delete the entity whose `name` matches
    pub async fn delete_by_name(&self, endpoint: &str, name: &str) -> Result<AdminPayload> {
        let records = self.search(endpoint, "name", name).await?;

        let record = records.into_iter().next().ok_or_else(|| {
            ApiError::NotFound(format!("no {} named '{}'", endpoint, name))
        })?;
        let id = match record.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(ApiError::InvalidResponse(format!(
                    "{} '{}' has no string or numeric id",
                    endpoint, name
                ))
                .into());
            }
        };

        log::debug!("Deleting {} '{}' ({})", endpoint, name, id);
        self.request(Method::DELETE, &format!("api/{}/{}", endpoint, id), None)
            .await
    }

    /// Bare authenticated call, e.g. `DELETE api/_action/cache`
    pub async fn clear_cache(&self, method: Method, url: &str) -> Result<ApiResponse> {
        let token = self.auth.authenticate().await?;
        let response = self
            .transport
            .execute(ApiRequest::new(method, url).bearer(token.access))
            .await?;
        ensure_success(response)
    }
}

fn ensure_success(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(response.status, response.body).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PROBE_PATH, TOKEN_PATH};
    use crate::client::MockTransport;
    use crate::error::Error;
    use crate::session::MemoryStore;

    const TOKEN_BODY: &str = r#"{"expires_in":600,"access_token":"tok","refresh_token":"ref"}"#;

    fn response(body: &str) -> ApiResponse {
        ApiResponse {
            status: 200,
            content_type: Some(JSON_API.to_string()),
            body: body.to_string(),
        }
    }

    /// Mock that accepts the probe and issues a token
    async fn base_mock() -> MockTransport {
        MockTransport::new()
            .respond(Method::GET, PROBE_PATH, 200, "{}")
            .await
            .respond(Method::POST, TOKEN_PATH, 200, TOKEN_BODY)
            .await
    }

    fn api(mock: &Arc<MockTransport>) -> (AdminApi, Session) {
        let session = Session::new(Arc::new(MemoryStore::new()), "/admin");
        let api = AdminApi::new(mock.clone(), session.clone(), &Settings::default());
        (api, session)
    }

    fn non_auth_requests(requests: Vec<ApiRequest>) -> Vec<ApiRequest> {
        requests
            .into_iter()
            .filter(|r| r.path != PROBE_PATH && r.path != TOKEN_PATH)
            .collect()
    }

    #[test]
    fn test_decode_single_element_is_unwrapped() {
        let payload = AdminPayload::decode(response(r#"{"data":[{"id":"x"}]}"#)).unwrap();
        assert_eq!(payload, AdminPayload::Record(Some(json!({"id": "x"}))));
    }

    #[test]
    fn test_decode_many_elements_kept() {
        let payload =
            AdminPayload::decode(response(r#"{"data":[{"id":"x"},{"id":"y"}]}"#)).unwrap();
        assert_eq!(
            payload,
            AdminPayload::Records(vec![json!({"id": "x"}), json!({"id": "y"})])
        );
    }

    #[test]
    fn test_decode_empty_list_is_none() {
        let payload = AdminPayload::decode(response(r#"{"data":[]}"#)).unwrap();
        assert_eq!(payload, AdminPayload::Record(None));
        assert_eq!(payload.into_value(), Value::Null);
    }

    #[test]
    fn test_decode_object_data() {
        let payload = AdminPayload::decode(response(r#"{"data":{"id":"x"}}"#)).unwrap();
        assert_eq!(payload, AdminPayload::Record(Some(json!({"id": "x"}))));
    }

    #[test]
    fn test_decode_empty_body_is_raw() {
        let mut empty = response("");
        empty.status = 204;
        let payload = AdminPayload::decode(empty.clone()).unwrap();
        assert_eq!(payload, AdminPayload::Raw(empty));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let result = AdminPayload::decode(response("<html>oops</html>"));
        assert!(matches!(result, Err(Error::Api(ApiError::InvalidResponse(_)))));
    }

    #[tokio::test]
    async fn test_login_stores_session_cookie() {
        let mock = Arc::new(base_mock().await);
        let (api, session) = api(&mock);

        let cookie = api.login().await.unwrap();

        assert_eq!(cookie.expires_at, None);
        assert_eq!(cookie.path, "/admin");
        assert_eq!(session.token().unwrap().unwrap().access, "tok");
    }

    #[tokio::test]
    async fn test_search_sends_equals_filter() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(
                    Method::POST,
                    "api/search/product",
                    200,
                    r#"{"data":[{"id":"p1","name":"Shirt"}]}"#,
                )
                .await,
        );
        let (api, _) = api(&mock);

        let records = api.search("product", "name", "Shirt").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "p1");

        let search = &non_auth_requests(mock.captured_requests().await)[0];
        assert_eq!(search.bearer.as_deref(), Some("tok"));
        assert_eq!(search.accept.as_deref(), Some(JSON_API));
        assert_eq!(
            search.body,
            Some(json!({"filter": [{"field": "name", "type": "equals", "value": "Shirt"}]}))
        );
    }

    #[tokio::test]
    async fn test_request_unwraps_and_fails_on_status() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(Method::GET, "api/currency", 200, r#"{"data":[{"id":"c1"}]}"#)
                .await
                .respond(Method::GET, "api/missing", 404, r#"{"errors":[]}"#)
                .await,
        );
        let (api, _) = api(&mock);

        let payload = api.request(Method::GET, "api/currency", None).await.unwrap();
        assert_eq!(payload, AdminPayload::Record(Some(json!({"id": "c1"}))));

        let missing = api.request(Method::GET, "api/missing", None).await;
        assert!(matches!(missing, Err(Error::Api(ApiError::NotFound(_)))));

        let sent = &non_auth_requests(mock.captured_requests().await)[0];
        assert_eq!(
            sent.query,
            vec![("response".to_string(), "true".to_string())]
        );
    }

    #[tokio::test]
    async fn test_update_patches_entity() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(Method::PATCH, "api/product/p1", 204, "")
                .await,
        );
        let (api, _) = api(&mock);

        let payload = api
            .update("product", "p1", json!({"stock": 10}))
            .await
            .unwrap();

        assert!(matches!(payload, AdminPayload::Raw(ApiResponse { status: 204, .. })));
        let patch = &non_auth_requests(mock.captured_requests().await)[0];
        assert_eq!(patch.method, Method::PATCH);
        assert_eq!(patch.body, Some(json!({"stock": 10})));
    }

    #[tokio::test]
    async fn test_delete_resolves_name_then_deletes() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(
                    Method::POST,
                    "api/search/products",
                    200,
                    r#"{"data":[{"id":"abc123","name":"Test Product"}]}"#,
                )
                .await
                .respond(Method::DELETE, "api/products/abc123", 204, "")
                .await,
        );
        let (api, _) = api(&mock);

        api.delete_by_name("products", "Test Product").await.unwrap();

        let calls = non_auth_requests(mock.captured_requests().await);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].path, "api/search/products");
        assert_eq!(
            calls[0].body,
            Some(json!({"filter": [{"field": "name", "type": "equals", "value": "Test Product"}]}))
        );
        assert_eq!(calls[1].method, Method::DELETE);
        assert_eq!(calls[1].path, "api/products/abc123");
    }

    #[tokio::test]
    async fn test_delete_unknown_name_is_not_found() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(Method::POST, "api/search/products", 200, r#"{"data":[]}"#)
                .await,
        );
        let (api, _) = api(&mock);

        let result = api.delete_by_name("products", "Ghost").await;

        match result {
            Err(Error::Api(ApiError::NotFound(msg))) => assert!(msg.contains("Ghost")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert_eq!(mock.count(Method::DELETE, "api/products/undefined").await, 0);
    }

    #[tokio::test]
    async fn test_delete_accepts_numeric_id() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(
                    Method::POST,
                    "api/search/tax",
                    200,
                    r#"{"data":[{"id":42,"name":"Reduced"}]}"#,
                )
                .await
                .respond(Method::DELETE, "api/tax/42", 204, "")
                .await,
        );
        let (api, _) = api(&mock);

        api.delete_by_name("tax", "Reduced").await.unwrap();

        assert_eq!(mock.count(Method::DELETE, "api/tax/42").await, 1);
    }

    #[tokio::test]
    async fn test_delete_record_without_id_is_invalid() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(
                    Method::POST,
                    "api/search/tax",
                    200,
                    r#"{"data":[{"name":"Reduced"}]}"#,
                )
                .await,
        );
        let (api, _) = api(&mock);

        let result = api.delete_by_name("tax", "Reduced").await;

        assert!(matches!(result, Err(Error::Api(ApiError::InvalidResponse(_)))));
        assert_eq!(non_auth_requests(mock.captured_requests().await).len(), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_sends_bare_request() {
        let mock = Arc::new(
            base_mock()
                .await
                .respond(Method::DELETE, "api/_action/cache", 204, "")
                .await,
        );
        let (api, _) = api(&mock);

        let response = api
            .clear_cache(Method::DELETE, "api/_action/cache")
            .await
            .unwrap();

        assert_eq!(response.status, 204);
        let call = &non_auth_requests(mock.captured_requests().await)[0];
        assert_eq!(call.bearer.as_deref(), Some("tok"));
        assert!(call.accept.is_none());
        assert!(call.body.is_none());
        assert!(call.query.is_empty());
    }
}
