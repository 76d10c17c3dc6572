//! Session management commands

use colored::Colorize;

use crate::cli::api::format_expiry;
use crate::cli::context::open_store;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::{FileConfig, Settings};
use crate::error::Result;
use crate::session::{BEARER_COOKIE, Session, SqliteStore, system_now};

/// Show stored cookies and token lifetime
pub fn status(opts: &GlobalOptions) -> Result<()> {
    let settings = Settings::resolve(FileConfig::load_at(opts.config_ref())?, opts.base_url_ref())?;
    let session = Session::new(open_store(opts)?, settings.admin_path.clone());
    let cookies = session.store().list()?;
    let token = session.token()?;
    let expires_at = session.token_cookie()?.and_then(|c| c.expires_at);

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "base_url": settings.base_url,
                "admin_path": session.admin_path(),
                "cookies": cookies.iter().map(|c| &c.name).collect::<Vec<_>>(),
                "token_cached": token.is_some(),
                "token_expiry": token.as_ref().map(|t| t.expiry),
                "cache_expires_at": expires_at,
                "path": session_path(opts),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            println!("{}\n", "adminctl Session Status".bold());
            println!("Admin API:   {}", settings.base_url.cyan());
            println!("Cookie path: {}", session.admin_path());
            println!("Session:     {}", session_path(opts));
            println!("Cookies:     {}", cookies.len());
            println!();

            match (token, expires_at) {
                (Some(_), Some(at)) => {
                    let remaining = at - system_now();
                    println!(
                        "{} {} cached (reused until {}, {}m {}s left)",
                        "✓".green(),
                        BEARER_COOKIE,
                        format_expiry(at),
                        remaining / 60,
                        remaining % 60
                    );
                }
                (Some(token), None) => {
                    println!(
                        "{} {} cached for the session (token expires {})",
                        "✓".green(),
                        BEARER_COOKIE,
                        format_expiry(token.expiry)
                    );
                }
                (None, _) => {
                    println!(
                        "{} No token cached (will authenticate on next command)",
                        "○".dimmed()
                    );
                }
            }
            println!();
        }
    }

    Ok(())
}

/// Remove every stored cookie
pub fn clear(opts: &GlobalOptions) -> Result<()> {
    let store = open_store(opts)?;
    let removed = store.clear()?;

    match opts.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "cookies_removed": removed,
                "success": true,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            if removed > 0 {
                println!("Cleared {} session cookies", removed);
            } else {
                println!("Session was already empty");
            }
        }
    }

    Ok(())
}

/// Show session database path
pub fn path(opts: &GlobalOptions) -> Result<()> {
    println!("{}", session_path(opts));
    Ok(())
}

fn session_path(opts: &GlobalOptions) -> String {
    if opts.ephemeral {
        return "(in memory)".to_string();
    }
    match opts.session_ref() {
        Some(p) => p.to_string(),
        None => SqliteStore::default_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
    }
}
