//! Admin API command handlers

use chrono::DateTime;
use colored::Colorize;
use reqwest::Method;
use serde_json::{Value, json};

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;

/// Print a valid bearer token
pub async fn token(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let token = ctx.api.authenticate().await?;

    match ctx.format {
        OutputFormat::Json => ctx.print("token", &token)?,
        OutputFormat::Pretty => {
            // Bare token so that `$(adminctl token)` works in shell scripts
            println!("{}", token.access);
            eprintln!(
                "{} token valid until {}",
                "✓".green(),
                format_expiry(token.expiry)
            );
        }
    }
    Ok(())
}

/// Authenticate and keep the cookie for the session
pub async fn login(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let cookie = ctx.api.login().await?;

    match ctx.format {
        OutputFormat::Json => ctx.print("login", &cookie)?,
        OutputFormat::Pretty => {
            println!(
                "{} Logged in as {} ({} cookie stored for path {})",
                "✓".green(),
                ctx.settings.credentials.username.bold(),
                cookie.name,
                cookie.path.cyan()
            );
        }
    }
    Ok(())
}

/// Find entities by exact field value
pub async fn search(opts: &GlobalOptions, endpoint: &str, field: &str, value: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let records = ctx.api.search(endpoint, field, value).await?;

    if records.is_empty() && ctx.format == OutputFormat::Pretty {
        eprintln!("No {} with {} = '{}'", endpoint, field, value);
        return Ok(());
    }
    ctx.print("search", &records)
}

/// Generic authenticated request
pub async fn request(
    opts: &GlobalOptions,
    method: Method,
    url: &str,
    data: Option<Value>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let payload = ctx.api.request(method, url, data).await?;
    ctx.print("request", &payload.into_value())
}

/// Update an entity by id
pub async fn update(opts: &GlobalOptions, endpoint: &str, id: &str, data: Value) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let payload = ctx.api.update(endpoint, id, data).await?;
    ctx.print("update", &payload.into_value())
}

/// Delete an entity by name
pub async fn delete(opts: &GlobalOptions, endpoint: &str, name: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let payload = ctx.api.delete_by_name(endpoint, name).await?;

    match ctx.format {
        OutputFormat::Json => ctx.print("delete", &payload.into_value())?,
        OutputFormat::Pretty => println!("{} Deleted {} '{}'", "✓".green(), endpoint, name),
    }
    Ok(())
}

/// Clear the application cache
pub async fn clear_cache(opts: &GlobalOptions, method: Method, url: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let response = ctx.api.clear_cache(method, url).await?;

    match ctx.format {
        OutputFormat::Json => ctx.print(
            "clear-cache",
            &json!({ "status": response.status, "success": true }),
        )?,
        OutputFormat::Pretty => {
            println!("{} Cache cleared (HTTP {})", "✓".green(), response.status)
        }
    }
    Ok(())
}

/// Format a unix timestamp in local time
pub(crate) fn format_expiry(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|d| {
            d.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}
