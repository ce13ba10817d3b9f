//! S11 travel map host.
//!
//! Loads the configuration, builds the shared map context, registers the
//! enabled built-in plugins and dispatches the context to them.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use s11_core::config::AppConfig;
use s11_core::error::AppError;
use s11_map::{HeadlessMap, MapContext, MapSurface};
use s11_plugin::{DebugLog, PluginLoader};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("S11_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Register plugins, dispatch the map context and wait for outcomes
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        "Starting S11 travel map v{} ({})",
        env!("CARGO_PKG_VERSION"),
        config.trip.name
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.plugins.settle_timeout_seconds.max(1)))
        .build()
        .map_err(|e| AppError::internal(format!("HTTP client init failed: {}", e)))?;

    // ── Step 1: Register plugins ─────────────────────────────────
    let loader = Arc::new(PluginLoader::<MapContext>::new());
    let plugins = &config.plugins;

    if plugins.is_enabled(plugin_location_indicator::PLUGIN_ID) {
        let service = plugin_location_indicator::HttpLocationService::new(
            http.clone(),
            config.trip.location_service_url.clone(),
        );
        plugin_location_indicator::register(&loader, Arc::new(service))?;
    }

    if plugins.is_enabled(plugin_photo_feed::PLUGIN_ID) {
        let service = plugin_photo_feed::HttpPhotoFeed::new(
            http.clone(),
            config.trip.photo_feed_url.clone(),
            config.trip.flickr_id.clone(),
        );
        plugin_photo_feed::register(&loader, Arc::new(service))?;
    }

    if plugins.is_enabled(plugin_help_control::PLUGIN_ID) {
        plugin_help_control::register(&loader)?;
    }

    for id in &plugins.enabled {
        if loader.state(id).is_none() {
            tracing::warn!(plugin_id = %id, "Unknown plugin in configuration");
        }
    }

    // ── Step 2: Build the map context ────────────────────────────
    let log = Arc::new(DebugLog::new());
    if plugins.debug_window {
        log.attach();
    }

    let map = Arc::new(HeadlessMap::new());
    let center = s11_map::LatLng::from_lng_lat(config.trip.init_center)?;
    map.center_on(center);

    let context = MapContext::new(
        Arc::clone(&log),
        Arc::clone(&map) as Arc<dyn MapSurface>,
        config.trip.clone(),
    )
    .with_http_client(http);

    // ── Step 3: Dispatch ─────────────────────────────────────────
    loader.initialize(Arc::new(context))?;

    // ── Step 4: Wait for outcomes ────────────────────────────────
    let timeout = Duration::from_secs(plugins.settle_timeout_seconds);
    if tokio::time::timeout(timeout, loader.wait_settled())
        .await
        .is_err()
    {
        tracing::warn!(
            pending = ?loader.pending(),
            "Plugins did not report an outcome within {}s",
            plugins.settle_timeout_seconds
        );
    }

    loader.log_plugin_list();
    tracing::info!(
        overlays = map.overlays().len(),
        "{}",
        loader.list_plugins()
    );

    Ok(())
}
