//! Bearer token acquisition with session caching
//!
//! [`Authenticator::authenticate`] hands out a token the admin API will
//! accept. A cached token is reused only after a probe request confirms it;
//! otherwise a new one is issued with the password grant and cached with a
//! safety margin so that nearly-expired tokens are replaced early.

use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{AdminTransport, ApiRequest};
use crate::config::{Credentials, Settings};
use crate::error::{ApiError, Result};
use crate::session::{Session, Token};

/// Token issuance endpoint
pub const TOKEN_PATH: &str = "api/oauth/token";

/// Cheap authenticated endpoint used to test a cached token
pub const PROBE_PATH: &str = "api/_info/version";

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    scopes: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
    expires_in: i64,
}

/// Produces valid bearer tokens for the admin API
pub struct Authenticator {
    transport: Arc<dyn AdminTransport>,
    session: Session,
    credentials: Credentials,
    min_token_lifetime: u64,
}

impl Authenticator {
    pub fn new(transport: Arc<dyn AdminTransport>, session: Session, settings: &Settings) -> Self {
        Self {
            transport,
            session,
            credentials: settings.credentials.clone(),
            min_token_lifetime: settings.min_token_lifetime,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Return a valid token, reusing the cached one when the API accepts it.
    pub async fn authenticate(&self) -> Result<Token> {
        // A token from a non-admin login must never stand in for the admin one
        if self.session.has_elevated_marker()? {
            log::debug!("Dropping cached token left by a non-admin login");
            self.session.clear_tokens()?;
        }

        if let Some(token) = self.session.token()? {
            if self.probe(&token).await? {
                log::debug!("Cached token accepted by {}", PROBE_PATH);
                return Ok(token);
            }
            log::debug!("Cached token rejected, requesting a new one");
            self.session.clear_tokens()?;
        }

        self.refresh().await
    }

    /// Ask the API whether it still accepts a token
    async fn probe(&self, token: &Token) -> Result<bool> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::GET, PROBE_PATH).bearer(&token.access))
            .await?;
        Ok(response.status == 200)
    }

    /// Issue a new token and cache it
    pub async fn refresh(&self) -> Result<Token> {
        let creds = &self.credentials;
        let body = serde_json::to_value(TokenRequest {
            grant_type: &creds.grant_type,
            client_id: &creds.client_id,
            scopes: &creds.scope,
            username: &creds.username,
            password: &creds.password,
        })?;

        let response = self
            .transport
            .execute(ApiRequest::new(Method::POST, TOKEN_PATH).json(body))
            .await?;

        if !response.is_success() {
            return Err(ApiError::AuthFailed {
                status: response.status,
                body: response.body,
            }
            .into());
        }

        let issued: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        let expiry = self
            .session
            .now()
            .checked_add(issued.expires_in)
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!(
                    "Token lifetime out of range: {}s",
                    issued.expires_in
                ))
            })?;
        let token = Token {
            access: issued.access_token,
            refresh: issued.refresh_token,
            expiry,
        };

        let min_lifetime = i64::try_from(self.min_token_lifetime).unwrap_or(i64::MAX);
        self.session
            .store_token(&token, Some(token.expiry.saturating_sub(min_lifetime)))?;

        log::debug!(
            "Issued token for '{}' (expires in {}s)",
            creds.username,
            issued.expires_in
        );
        Ok(token)
    }
}
