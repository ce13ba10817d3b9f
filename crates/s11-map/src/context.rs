//! Map context — the application data dispatched to every plugin.

use std::sync::Arc;

use s11_core::config::trip::TripConfig;
use s11_plugin::{DebugLog, PluginHost};

use crate::surface::MapSurface;

/// Shared application data: created once by the host and handed to every
/// plugin callback by reference.
#[derive(Clone)]
pub struct MapContext {
    /// Debug log the loader and plugins write to.
    pub log: Arc<DebugLog>,
    /// Map surface plugins add overlays to.
    pub map: Arc<dyn MapSurface>,
    /// Trip options.
    pub trip: TripConfig,
    /// HTTP client for plugins that fetch remote data.
    pub http: reqwest::Client,
}

impl MapContext {
    /// Creates a context with a default HTTP client.
    pub fn new(log: Arc<DebugLog>, map: Arc<dyn MapSurface>, trip: TripConfig) -> Self {
        Self {
            log,
            map,
            trip,
            http: reqwest::Client::new(),
        }
    }

    /// Replaces the HTTP client.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }
}

impl PluginHost for MapContext {
    fn log(&self, message: &str) {
        self.log.write(message);
    }
}

impl std::fmt::Debug for MapContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapContext")
            .field("trip", &self.trip.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessMap;

    #[test]
    fn test_log_goes_to_debug_log() {
        let log = Arc::new(DebugLog::new());
        let context = MapContext::new(
            Arc::clone(&log),
            Arc::new(HeadlessMap::new()),
            TripConfig::default(),
        );

        PluginHost::log(&context, "zoom: 5");
        assert_eq!(log.history(), vec!["zoom: 5"]);
    }
}
