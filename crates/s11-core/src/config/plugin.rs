//! Plugin system configuration.

use serde::{Deserialize, Serialize};

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Identifiers of the built-in plugins the host registers at startup.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<String>,
    /// How long the host waits for plugins to report an outcome before
    /// logging the ones still loading.
    #[serde(default = "default_settle_timeout")]
    pub settle_timeout_seconds: u64,
    /// Whether the debug log is shown (attached) from the start.
    #[serde(default)]
    pub debug_window: bool,
}

impl PluginConfig {
    /// Returns whether the plugin with the given id is enabled.
    pub fn is_enabled(&self, plugin_id: &str) -> bool {
        self.enabled.iter().any(|id| id == plugin_id)
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            settle_timeout_seconds: default_settle_timeout(),
            debug_window: false,
        }
    }
}

fn default_enabled() -> Vec<String> {
    vec![
        "locationIndicator".to_string(),
        "photoFeed".to_string(),
        "helpControl".to_string(),
    ]
}

fn default_settle_timeout() -> u64 {
    30
}
