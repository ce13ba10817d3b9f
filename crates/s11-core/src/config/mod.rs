//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section falls back to its defaults when absent.

pub mod logging;
pub mod plugin;
pub mod trip;

use std::path::Path;

use serde::{Deserialize, Serialize};

use self::logging::LoggingConfig;
use self::plugin::PluginConfig;
use self::trip::TripConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Plugin system settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Trip options handed to plugins.
    #[serde(default)]
    pub trip: TripConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `S11__`. `S11__PLUGINS__ENABLED`
    /// takes a comma-separated list of plugin ids.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_with_environment(env, Self::environment())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("S11")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("plugins.enabled")
    }

    fn load_with_environment(
        env: &str,
        environment: config::Environment,
    ) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from a single TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let config = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to read config '{}': {e}",
                    path.display()
                ))
            })?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_builtin_plugins() {
        let config = AppConfig::default();
        assert!(config.plugins.is_enabled("locationIndicator"));
        assert!(config.plugins.is_enabled("photoFeed"));
        assert!(config.plugins.is_enabled("helpControl"));
        assert!(!config.plugins.debug_window);
        assert_eq!(config.plugins.settle_timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("trip.toml");
        std::fs::write(
            &path,
            r##"
[plugins]
enabled = ["helpControl"]
debug_window = true

[trip]
flickr_id = "12345@N00"
flickr_tags = "food, temple,,"

[trip.legend]
food = "#ff0000"
temple = "#00ff00"
"##,
        )
        .expect("write");

        let config = AppConfig::load_from(&path).expect("should load");
        assert_eq!(config.plugins.enabled, vec!["helpControl".to_string()]);
        assert!(config.plugins.debug_window);
        assert!(!config.plugins.is_enabled("photoFeed"));
        assert_eq!(config.trip.flickr_id, "12345@N00");
        assert_eq!(config.trip.photo_tags(), vec!["food", "temple"]);
        assert_eq!(config.trip.legend.get("temple").map(String::as_str), Some("#00ff00"));
        // Untouched sections keep their defaults
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.plugins.settle_timeout_seconds, 30);
    }

    #[test]
    fn test_env_overrides_enabled_plugins() {
        let vars = config::Map::from([
            (
                "S11__PLUGINS__ENABLED".to_string(),
                "helpControl,photoFeed".to_string(),
            ),
            ("S11__PLUGINS__DEBUG_WINDOW".to_string(), "true".to_string()),
            ("S11__LOGGING__LEVEL".to_string(), "debug".to_string()),
        ]);
        let environment = AppConfig::environment().source(Some(vars));

        let config =
            AppConfig::load_with_environment("nonexistent", environment).expect("should load");
        assert_eq!(
            config.plugins.enabled,
            vec!["helpControl".to_string(), "photoFeed".to_string()]
        );
        assert!(!config.plugins.is_enabled("locationIndicator"));
        assert!(config.plugins.debug_window);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_env_single_plugin_is_a_list() {
        let vars = config::Map::from([(
            "S11__PLUGINS__ENABLED".to_string(),
            "helpControl".to_string(),
        )]);
        let environment = AppConfig::environment().source(Some(vars));

        let config =
            AppConfig::load_with_environment("nonexistent", environment).expect("should load");
        assert_eq!(config.plugins.enabled, vec!["helpControl".to_string()]);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = AppConfig::load_from(dir.path().join("missing.toml")).expect_err("missing");
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
