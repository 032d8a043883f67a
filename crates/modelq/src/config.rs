//! Query builder configuration.

use crate::error::OrmResult;
use serde::Deserialize;

/// Alias used for `count()` results when the caller does not provide one.
pub const DEFAULT_COUNT_ALIAS: &str = "__count";

/// Configuration shared by query builders.
///
/// Can be built in code or loaded from TOML:
///
/// ```toml
/// count_alias = "total"
/// log_descriptors = true
/// max_logged_len = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Alias for the aggregate column of `count()`.
    pub count_alias: String,
    /// Emit a `tracing` debug event with the descriptor on every terminal call.
    pub log_descriptors: bool,
    /// Truncate logged descriptors (in bytes). `None` means no truncation.
    pub max_logged_len: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            count_alias: DEFAULT_COUNT_ALIAS.to_string(),
            log_descriptors: true,
            max_logged_len: Some(200),
        }
    }
}

impl QueryConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a TOML document. Missing keys use defaults.
    pub fn from_toml_str(s: &str) -> OrmResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Set the default `count()` alias. Blank values keep the current alias.
    pub fn with_count_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        if !alias.trim().is_empty() {
            self.count_alias = alias;
        }
        self
    }

    /// Enable or disable descriptor logging.
    pub fn log_descriptors(mut self, enabled: bool) -> Self {
        self.log_descriptors = enabled;
        self
    }

    /// Set the maximum logged descriptor length.
    pub fn max_logged_len(mut self, len: usize) -> Self {
        self.max_logged_len = Some(len);
        self
    }

    /// Disable truncation of logged descriptors.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_len = None;
        self
    }
}

/// Truncate `s` to at most `max_bytes`, on a char boundary.
pub(crate) fn truncate_bytes(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Apply an optional length limit, appending `...` when cut.
pub(crate) fn truncate_for_log(s: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if s.len() > max => format!("{}...", truncate_bytes(s, max)),
        _ => s.to_string(),
    }
}
