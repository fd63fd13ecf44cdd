//! Parser configuration

use crate::format::FormatSet;
use serde::{Deserialize, Serialize};

/// Options of a [`Parser`](crate::Parser), usually deserialized from JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Formats to extract (bitmask, see [`FormatSet`])
    pub formats: FormatSet,
    /// User agent sent with document and context requests
    pub user_agent: String,
    /// Global timeout of one HTTP request
    pub timeout_secs: u64,
    /// Raise warnings as errors instead of skipping what cannot be parsed
    pub strict: bool,
    /// Allow fetching remote JSON-LD contexts that are not cached
    pub fetch_contexts: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            formats: FormatSet::ALL,
            user_agent: concat!("micrometa/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
            strict: false,
            fetch_contexts: true,
        }
    }
}
