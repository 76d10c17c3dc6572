//! Configuration management for adminctl
//!
//! Settings come from four layers, highest first: CLI flag, environment
//! variable, config file (`~/.adminctl/config.yaml`), built-in default.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_ADMIN_PATH: &str = "/admin";
pub const DEFAULT_MIN_TOKEN_LIFETIME: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_GRANT_TYPE: &str = "password";
pub const DEFAULT_CLIENT_ID: &str = "administration";
pub const DEFAULT_SCOPE: &str = "write";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "shopware";

/// On-disk configuration file. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Cookie path of the administration frontend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_path: Option<String>,

    /// Seconds of lifetime a cached token must have left to be reused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_auth_token_lifetime: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub credentials: CredentialConfig,
}

/// Credential overrides from the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grant_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl FileConfig {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".adminctl").join("config.yaml"))
    }

    /// Load from an explicit path, or from the default path if none given.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// path is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    return Err(ConfigError::Invalid(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Self::load_from(path)
            }
            None => {
                let path = Self::default_path()?;
                if !path.exists() {
                    log::debug!("No config file at {}, using defaults", path.display());
                    return Ok(Self::default());
                }
                Self::load_from(path)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)?;
        let config: FileConfig = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        Ok(config)
    }
}

/// Resolved credentials for the token endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub grant_type: String,
    pub client_id: String,
    pub scope: String,
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            grant_type: DEFAULT_GRANT_TYPE.to_string(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub admin_path: String,
    pub min_token_lifetime: u64,
    pub timeout: Duration,
    pub credentials: Credentials,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_path: DEFAULT_ADMIN_PATH.to_string(),
            min_token_lifetime: DEFAULT_MIN_TOKEN_LIFETIME,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials: Credentials::default(),
        }
    }
}

impl Settings {
    /// Resolve settings against the process environment
    pub fn resolve(file: FileConfig, base_url_flag: Option<&str>) -> Result<Self> {
        Self::resolve_with(file, base_url_flag, |key| std::env::var(key).ok())
    }

    /// Resolve settings with an explicit environment lookup.
    ///
    /// Empty environment values count as unset.
    pub fn resolve_with<F>(file: FileConfig, base_url_flag: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.is_empty());
        let creds = file.credentials;

        let credentials = Credentials {
            grant_type: var("ADMINCTL_GRANT")
                .or(creds.grant_type)
                .unwrap_or_else(|| DEFAULT_GRANT_TYPE.to_string()),
            client_id: var("ADMINCTL_CLIENT_ID")
                .or(creds.client_id)
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            scope: var("ADMINCTL_SCOPE")
                .or(creds.scope)
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            username: var("ADMINCTL_USERNAME")
                .or_else(|| var("ADMINCTL_USER"))
                .or(creds.username)
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            password: var("ADMINCTL_PASSWORD")
                .or_else(|| var("ADMINCTL_PASS"))
                .or(creds.password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        };

        let min_token_lifetime = match var("ADMINCTL_MIN_AUTH_TOKEN_LIFETIME") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "ADMINCTL_MIN_AUTH_TOKEN_LIFETIME must be a number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => file
                .min_auth_token_lifetime
                .unwrap_or(DEFAULT_MIN_TOKEN_LIFETIME),
        };

        let base_url = base_url_flag
            .map(str::to_string)
            .or_else(|| var("ADMINCTL_BASE_URL"))
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(
                ConfigError::Invalid(format!("base URL must be http(s): {}", base_url)).into(),
            );
        }

        Ok(Self {
            base_url,
            admin_path: var("ADMINCTL_ADMIN")
                .or(file.admin_path)
                .unwrap_or_else(|| DEFAULT_ADMIN_PATH.to_string()),
            min_token_lifetime,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            credentials,
        })
    }
}
