//! Shared CLI argument types

mod common;
mod global;

pub use common::{OutputFormat, parse_json_arg, parse_method};
pub use global::GlobalOptions;
