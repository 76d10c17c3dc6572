//! JSON envelope for command results
//!
//! `--format json` output is `{ "data": ..., "meta": ... }`. The metadata
//! says which command produced the data and against which admin API, so
//! results captured from several shops stay distinguishable.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

/// Where a result came from
#[derive(Debug, Clone, Copy)]
pub struct Origin<'a> {
    /// Subcommand name, e.g. `search`
    pub command: &'a str,
    /// Resolved admin API base URL
    pub admin_api: &'a str,
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    data: Value,
    meta: Meta<'a>,
}

#[derive(Debug, Serialize)]
struct Meta<'a> {
    command: &'a str,
    admin_api: &'a str,
    /// Only set when `data` is a list
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<usize>,
    timestamp: String,
    version: &'static str,
}

/// Wrap a result in the JSON envelope
pub fn format_json<T: Serialize + ?Sized>(
    data: &T,
    origin: Origin<'_>,
) -> Result<String, serde_json::Error> {
    let data = serde_json::to_value(data)?;
    let envelope = Envelope {
        meta: Meta {
            command: origin.command,
            admin_api: origin.admin_api,
            records: data.as_array().map(Vec::len),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        },
        data,
    };
    serde_json::to_string_pretty(&envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ORIGIN: Origin<'static> = Origin {
        command: "search",
        admin_api: "http://shop.test",
    };

    fn parse(output: &str) -> Value {
        serde_json::from_str(output).unwrap()
    }

    #[test]
    fn test_envelope_names_command_and_api() {
        let out = parse(&format_json(&json!({"id": "p1"}), ORIGIN).unwrap());

        assert_eq!(out["data"]["id"], "p1");
        assert_eq!(out["meta"]["command"], "search");
        assert_eq!(out["meta"]["admin_api"], "http://shop.test");
        assert_eq!(out["meta"]["version"], env!("CARGO_PKG_VERSION"));
        assert!(out["meta"]["timestamp"].is_string());
    }

    #[test]
    fn test_list_counts_records() {
        let records = vec![json!({"name": "Shirt"}), json!({"name": "Trousers"})];
        let out = parse(&format_json(&records, ORIGIN).unwrap());

        assert_eq!(out["meta"]["records"], 2);
        assert_eq!(out["data"][1]["name"], "Trousers");
    }

    #[test]
    fn test_empty_list_counts_zero() {
        let out = parse(&format_json(&Vec::<Value>::new(), ORIGIN).unwrap());
        assert_eq!(out["meta"]["records"], 0);
    }

    #[test]
    fn test_single_record_has_no_count() {
        let out = parse(&format_json(&Value::Null, ORIGIN).unwrap());

        assert!(out["data"].is_null());
        assert!(out["meta"].get("records").is_none());
    }
}
