//! Common CLI types and value parsers

use reqwest::Method;
use serde_json::Value;

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty format - human-optimized rich formatting
    #[default]
    Pretty,
    /// JSON format - structured for scripts/APIs
    Json,
}

/// Parse an HTTP method name (case-insensitive)
pub fn parse_method(value: &str) -> Result<Method, String> {
    let upper = value.trim().to_ascii_uppercase();
    match upper.as_str() {
        "GET" | "POST" | "PUT" | "PATCH" | "DELETE" | "HEAD" | "OPTIONS" => {
            Method::from_bytes(upper.as_bytes()).map_err(|e| e.to_string())
        }
        _ => Err(format!("unsupported HTTP method '{}'", value)),
    }
}

/// Parse a JSON argument, or read it from a file when prefixed with `@`
pub fn parse_json_arg(value: &str) -> Result<Value, String> {
    let raw = match value.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path, e))?,
        None => value.to_string(),
    };
    serde_json::from_str(&raw).map_err(|e| format!("invalid JSON: {}", e))
}
