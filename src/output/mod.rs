//! Output formatting for CLI results

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod json;

pub use json::Origin;

/// Print a serializable result.
///
/// Pretty output is the bare value as indented JSON; JSON output wraps it
/// in an envelope naming its origin.
pub fn print<T: Serialize + ?Sized>(data: &T, format: OutputFormat, origin: Origin<'_>) -> Result<()> {
    let output = render(data, format, origin)?;
    println!("{}", output);
    Ok(())
}

/// Render a result without printing it
pub fn render<T: Serialize + ?Sized>(
    data: &T,
    format: OutputFormat,
    origin: Origin<'_>,
) -> Result<String> {
    let output = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(data)?,
        OutputFormat::Json => json::format_json(data, origin)?,
    };
    Ok(output)
}
