//! In-process session store

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Clock, Cookie, SessionStore, system_now};
use crate::error::SessionError;

type Result<T> = std::result::Result<T, SessionError>;

/// Cookie jar that lives as long as the process
pub struct MemoryStore {
    cookies: Mutex<HashMap<String, Cookie>>,
    now: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            cookies: Mutex::new(HashMap::new()),
            now: system_now,
        }
    }

    #[cfg(test)]
    pub fn with_clock(now: Clock) -> Self {
        Self {
            cookies: Mutex::new(HashMap::new()),
            now,
        }
    }

    fn is_live(&self, cookie: &Cookie) -> bool {
        cookie.expires_at.is_none_or(|at| at > (self.now)())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, name: &str) -> Result<Option<Cookie>> {
        let cookies = self.cookies.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(cookies.get(name).filter(|c| self.is_live(c)).cloned())
    }

    fn set(&self, cookie: Cookie) -> Result<()> {
        let mut cookies = self.cookies.lock().map_err(|_| SessionError::Poisoned)?;
        cookies.insert(cookie.name.clone(), cookie);
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool> {
        let mut cookies = self.cookies.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(cookies.remove(name).is_some())
    }

    fn clear(&self) -> Result<usize> {
        let mut cookies = self.cookies.lock().map_err(|_| SessionError::Poisoned)?;
        let count = cookies.len();
        cookies.clear();
        Ok(count)
    }

    fn list(&self) -> Result<Vec<Cookie>> {
        let cookies = self.cookies.lock().map_err(|_| SessionError::Poisoned)?;
        let mut live: Vec<Cookie> = cookies
            .values()
            .filter(|c| self.is_live(c))
            .cloned()
            .collect();
        live.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(live)
    }
}
