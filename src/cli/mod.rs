//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::Value;

pub mod api;
pub mod args;
pub mod context;
pub mod session;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

use args::{parse_json_arg, parse_method};

/// adminctl - admin API companion for end-to-end test setup
#[derive(Parser, Debug)]
#[command(name = "adminctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, json)
    #[arg(
        long,
        global = true,
        env = "ADMINCTL_FORMAT",
        default_value = "pretty",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "ADMINCTL_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Admin API base URL (e.g. http://localhost:8000)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override session database location
    #[arg(long, global = true, env = "ADMINCTL_SESSION", hide_env = true)]
    pub session: Option<String>,

    /// Keep the session in memory; nothing is reused between runs
    #[arg(long, global = true, conflicts_with = "session")]
    pub ephemeral: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "ADMINCTL_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a valid bearer token, reusing the cached one when possible
    Token,

    /// Authenticate and keep the token cookie for the session
    Login,

    /// Find entities by exact field value
    Search {
        /// Entity endpoint (e.g. product)
        endpoint: String,

        /// Field to filter on
        #[arg(long, default_value = "name")]
        field: String,

        /// Value the field must equal
        #[arg(long)]
        value: String,
    },

    /// Send an authenticated request to the admin API
    #[command(after_help = "EXAMPLES:\n  \
            adminctl request GET api/currency\n  \
            adminctl request POST api/tag --data '{\"name\":\"e2e\"}'\n  \
            adminctl request PATCH api/product/<id> --data @payload.json")]
    Request {
        /// HTTP method
        #[arg(value_parser = parse_method)]
        method: Method,

        /// Path relative to the base URL
        url: String,

        /// JSON body, or @file to read it from a file
        #[arg(long, value_parser = parse_json_arg)]
        data: Option<Value>,
    },

    /// Update an entity by id
    Update {
        /// Entity endpoint (e.g. product)
        endpoint: String,

        /// Entity id
        id: String,

        /// JSON body, or @file to read it from a file
        #[arg(long, value_parser = parse_json_arg)]
        data: Value,
    },

    /// Delete an entity by name
    Delete {
        /// Entity endpoint (e.g. product)
        endpoint: String,

        /// Value of the entity's name field
        name: String,
    },

    /// Clear the application cache
    ClearCache {
        /// HTTP method
        #[arg(long, default_value = "DELETE", value_parser = parse_method)]
        method: Method,

        /// Cache endpoint
        #[arg(long, default_value = "api/_action/cache")]
        url: String,
    },

    /// Inspect or reset the stored session
    #[command(subcommand)]
    Session(SessionCommands),

    /// Display version information
    Version,
}

/// Session management subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Show stored cookies and token lifetime
    Status,

    /// Remove every stored cookie
    Clear,

    /// Print the session database path
    Path,
}
