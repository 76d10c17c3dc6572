//! Command execution context
//!
//! Loads configuration, opens the session store and wires the admin API
//! helpers, so every command handler starts from one ready value.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::admin::AdminApi;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::HttpTransport;
use crate::config::{FileConfig, Settings};
use crate::error::Result;
use crate::output::{self, Origin};
use crate::session::{MemoryStore, Session, SessionStore, SqliteStore};

/// Context for command execution containing settings, session and API helpers.
pub struct CommandContext {
    /// Resolved settings
    pub settings: Settings,
    /// Session holding the cached token
    pub session: Session,
    /// Authenticated admin API helpers
    pub api: AdminApi,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// # Errors
    /// Returns error if config cannot be loaded, the session store cannot be
    /// opened, or the HTTP client cannot be built.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let file = FileConfig::load_at(opts.config_ref())?;
        let settings = Settings::resolve(file, opts.base_url_ref())?;
        log::debug!("Admin API at {}", settings.base_url);

        let store = open_store(opts)?;
        let session = Session::new(store, settings.admin_path.clone());

        let transport = Arc::new(HttpTransport::new(&settings)?);
        let api = AdminApi::new(transport, session.clone(), &settings);

        Ok(Self {
            settings,
            session,
            api,
            format: opts.format,
        })
    }

    /// Print a command result in the selected format
    pub fn print<T: Serialize + ?Sized>(&self, command: &str, data: &T) -> Result<()> {
        let origin = Origin {
            command,
            admin_api: &self.settings.base_url,
        };
        output::print(data, self.format, origin)
    }
}

/// Open the session store selected by the global options
pub fn open_store(opts: &GlobalOptions) -> Result<Arc<dyn SessionStore>> {
    if opts.ephemeral {
        log::debug!("Using in-memory session");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = match opts.session_ref() {
        Some(path) => SqliteStore::open_at(Path::new(path))?,
        None => SqliteStore::open()?,
    };
    log::debug!("Using session at {}", store.path().display());
    Ok(Arc::new(store))
}
