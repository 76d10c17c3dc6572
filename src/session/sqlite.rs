//! SQLite-backed session store
//!
//! Keeps the cookie jar across process invocations so consecutive test
//! steps reuse one bearer token.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Cookie, SameSite, SessionStore};
use crate::error::SessionError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

type Result<T> = std::result::Result<T, SessionError>;

/// Persistent cookie jar
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create the store at the default XDG cache location
    pub fn open() -> Result<Self> {
        Self::open_at(&Self::default_path()?)
    }

    /// Default database path (~/.cache/adminctl/session.db on Linux)
    pub fn default_path() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(SessionError::NoHome)?;
        Ok(cache_base.join("adminctl").join("session.db"))
    }

    /// Open the store at a specific database file
    pub fn open_at(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SessionError::Io(format!("Failed to create session dir: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Session schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            std::fs::remove_file(db_path)
                .map_err(|e| SessionError::Io(format!("Failed to remove session DB: {}", e)))?;
            return Self::open_at(db_path);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cookies (
                name TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                path TEXT NOT NULL,
                same_site TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_cookie_expires_at ON cookies(expires_at);
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
            path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn row_to_cookie(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cookie> {
        let same_site: String = row.get(3)?;
        Ok(Cookie {
            name: row.get(0)?,
            value: row.get(1)?,
            path: row.get(2)?,
            same_site: SameSite::parse(&same_site),
            expires_at: row.get(4)?,
        })
    }
}

impl SessionStore for SqliteStore {
    fn get(&self, name: &str) -> Result<Option<Cookie>> {
        let conn = self.conn.lock().map_err(|_| SessionError::Poisoned)?;
        let now = Utc::now().timestamp();

        let cookie = conn
            .query_row(
                "SELECT name, value, path, same_site, expires_at FROM cookies
                 WHERE name = ?1 AND (expires_at IS NULL OR expires_at > ?2)",
                params![name, now],
                Self::row_to_cookie,
            )
            .optional()?;
        Ok(cookie)
    }

    fn set(&self, cookie: Cookie) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| SessionError::Poisoned)?;
        conn.execute(
            "INSERT OR REPLACE INTO cookies
             (name, value, path, same_site, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                cookie.name,
                cookie.value,
                cookie.path,
                cookie.same_site.as_str(),
                Utc::now().timestamp(),
                cookie.expires_at
            ],
        )?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock().map_err(|_| SessionError::Poisoned)?;
        let deleted = conn.execute("DELETE FROM cookies WHERE name = ?1", [name])?;
        Ok(deleted > 0)
    }

    fn clear(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|_| SessionError::Poisoned)?;
        let deleted = conn.execute("DELETE FROM cookies", [])?;
        Ok(deleted)
    }

    fn list(&self) -> Result<Vec<Cookie>> {
        let conn = self.conn.lock().map_err(|_| SessionError::Poisoned)?;
        let now = Utc::now().timestamp();

        let mut stmt = conn.prepare(
            "SELECT name, value, path, same_site, expires_at FROM cookies
             WHERE expires_at IS NULL OR expires_at > ?1
             ORDER BY name",
        )?;
        let cookies = stmt
            .query_map([now], Self::row_to_cookie)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cookies)
    }
}
