//! Compiler configuration.

use std::env;

/// Default maximum nesting depth of a filter query.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Filter compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Deepest nesting of queries, operator maps and logical lists accepted
    /// before compilation is aborted.
    pub max_depth: usize,
}

impl CompilerConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `DYNAQUERY_MAX_DEPTH`; unset or unparsable values keep the default.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_depth: parse_or(lookup("DYNAQUERY_MAX_DEPTH"), DEFAULT_MAX_DEPTH),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

fn parse_or(value: Option<String>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
