//! Emitter configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Listener count above which registering logs an error.
pub const DEFAULT_MAX_LISTENERS: usize = 512;

/// Timeout used by waits that do not name one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for an [`Emitter`](crate::emitter::Emitter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Soft threshold on listeners per event; exceeding it is only logged.
    pub max_listeners: usize,
    /// Default timeout for `eventually` / `eventually_if`.
    pub default_timeout: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
            default_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EmitterConfig {
    /// Parse a JSON document; absent fields keep their defaults
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
