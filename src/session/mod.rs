//! Session state: the cookie jar that holds the cached bearer token
//!
//! A [`SessionStore`] is a small key-value store with per-entry expiry.
//! [`Session`] layers the token cookie conventions of the administration
//! frontend on top of it and is passed explicitly to everything that needs
//! the cached token.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SessionError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

type Result<T> = std::result::Result<T, SessionError>;

/// Cookie holding the JSON-encoded bearer token
pub const BEARER_COOKIE: &str = "bearerAuth";

/// Marker left behind by a non-administrative login
pub const ELEVATED_MARKER_COOKIE: &str = "refreshBearerAuth";

/// Source of "now" in unix seconds
pub type Clock = fn() -> i64;

/// Wall-clock time in unix seconds
pub fn system_now() -> i64 {
    Utc::now().timestamp()
}

/// SameSite attribute of a stored cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "strict",
            SameSite::Lax => "lax",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "lax" => SameSite::Lax,
            _ => SameSite::Strict,
        }
    }
}

/// A stored cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub same_site: SameSite,
    /// Unix seconds after which the store stops returning the cookie.
    /// `None` keeps it for the life of the session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Key-value cookie storage with per-entry expiry
pub trait SessionStore: Send + Sync {
    /// Get a cookie by name. Expired cookies are never returned.
    fn get(&self, name: &str) -> Result<Option<Cookie>>;

    /// Insert or replace a cookie
    fn set(&self, cookie: Cookie) -> Result<()>;

    /// Remove a cookie, returning whether it existed
    fn remove(&self, name: &str) -> Result<bool>;

    /// Remove every cookie, returning how many were removed
    fn clear(&self) -> Result<usize>;

    /// All unexpired cookies
    fn list(&self) -> Result<Vec<Cookie>>;
}

/// Bearer token as cached in the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Access token sent as `Authorization: Bearer`
    pub access: String,

    /// Refresh token (stored, never exercised)
    #[serde(default)]
    pub refresh: String,

    /// Server-side expiry in unix seconds
    pub expiry: i64,
}

/// Session context owning the cached token
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    admin_path: String,
    now: Clock,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>, admin_path: impl Into<String>) -> Self {
        Self {
            store,
            admin_path: admin_path.into(),
            now: system_now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, now: Clock) -> Self {
        self.now = now;
        self
    }

    pub fn now(&self) -> i64 {
        (self.now)()
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    pub fn admin_path(&self) -> &str {
        &self.admin_path
    }

    /// Whether a token from a non-administrative login is lingering
    pub fn has_elevated_marker(&self) -> Result<bool> {
        Ok(self.store.get(ELEVATED_MARKER_COOKIE)?.is_some())
    }

    /// Raw bearer cookie, if present and unexpired
    pub fn token_cookie(&self) -> Result<Option<Cookie>> {
        self.store.get(BEARER_COOKIE)
    }

    /// The cached token. A value that fails to decode counts as absent.
    pub fn token(&self) -> Result<Option<Token>> {
        let Some(cookie) = self.token_cookie()? else {
            return Ok(None);
        };

        match serde_json::from_str::<Token>(&cookie.value) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                log::warn!("Ignoring malformed {} cookie: {}", BEARER_COOKIE, e);
                Ok(None)
            }
        }
    }

    /// Store the token cookie with the given expiry, returning what was stored
    pub fn store_token(&self, token: &Token, expires_at: Option<i64>) -> Result<Cookie> {
        let value = serde_json::to_string(token)
            .map_err(|e| SessionError::Io(format!("Failed to encode token: {}", e)))?;

        let cookie = Cookie {
            name: BEARER_COOKIE.to_string(),
            value,
            path: self.admin_path.clone(),
            same_site: SameSite::Strict,
            expires_at,
        };
        self.store.set(cookie.clone())?;
        Ok(cookie)
    }

    /// Drop the bearer cookie and the elevated marker
    pub fn clear_tokens(&self) -> Result<()> {
        self.store.remove(BEARER_COOKIE)?;
        self.store.remove(ELEVATED_MARKER_COOKIE)?;
        Ok(())
    }
}
