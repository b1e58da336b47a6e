// SPDX-License-Identifier: PMPL-1.0-or-later
//! Dialog configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DialogError, Result};

/// Screen layout the dialog is presented in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Desktop,
    /// Small screens: a non-empty result is offered as a link to the list.
    Handheld,
}

/// Configuration for an ad-hoc query dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    pub layout: Layout,
    /// Refuse a second `run_query` while one is outstanding.
    /// Default: true.
    pub reject_concurrent_queries: bool,
    /// Drop a response that arrives after the feature type or the loaded
    /// predicate changed.
    /// Default: true.
    pub discard_stale_results: bool,
    /// Give up on a datasource call after this many milliseconds.
    /// Default: none.
    pub query_timeout_ms: Option<u64>,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            layout: Layout::Desktop,
            reject_concurrent_queries: true,
            discard_stale_results: true,
            query_timeout_ms: None,
        }
    }
}

impl DialogConfig {
    pub fn handheld() -> Self {
        Self {
            layout: Layout::Handheld,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.query_timeout_ms == Some(0) {
            return Err(DialogError::Config("query_timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DialogConfig::default();
        assert_eq!(config.layout, Layout::Desktop);
        assert!(config.reject_concurrent_queries);
        assert!(config.discard_stale_results);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = DialogConfig {
            query_timeout_ms: Some(0),
            ..DialogConfig::default()
        };
        assert!(matches!(config.validate(), Err(DialogError::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DialogConfig =
            serde_json::from_str(r#"{"layout": "handheld", "query_timeout_ms": 5000}"#).unwrap();
        assert_eq!(config.layout, Layout::Handheld);
        assert_eq!(config.query_timeout_ms, Some(5000));
        assert!(config.reject_concurrent_queries);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = DialogConfig::handheld();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DialogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
