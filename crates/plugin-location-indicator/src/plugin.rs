//! Plugin registration and location display.

use std::sync::Arc;

use tracing::{info, warn};

use s11_core::error::AppError;
use s11_core::result::AppResult;
use s11_map::{ControlAction, LatLng, LatLngBounds, MapContext, MapControl, Place};
use s11_plugin::{PluginHost, PluginLoader, PluginTicket};

use crate::service::LocationService;

/// Plugin identifier.
pub const PLUGIN_ID: &str = "locationIndicator";

const FIND_ME_TITLE: &str = "Find me";
const FIND_ME_ICON: &str =
    "https://drive.google.com/uc?export=download&id=0B48vYXs63P2ld3RrcmtlM1pWYVU";
/// Degrees around the location the "Find me" control zooms to.
const FIND_ME_MARGIN: f64 = 0.2;
/// The location marker is hidden when zoomed out further than this.
const MIN_ZOOM: u8 = 8;

/// Registers the location indicator with the loader.
///
/// On dispatch the location is fetched in a background task; the plugin
/// reports `ACTIVE` once the marker is on the map and `FAILED` when the
/// service cannot be reached or returns an invalid position.
pub fn register(
    loader: &Arc<PluginLoader<MapContext>>,
    service: Arc<dyn LocationService>,
) -> AppResult<()> {
    let handle = Arc::downgrade(loader);

    loader.register_with_ticket(PLUGIN_ID, move |context: &Arc<MapContext>, ticket: &PluginTicket| {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AppError::plugin(format!("{PLUGIN_ID} needs a tokio runtime: {e}"))
        })?;

        let handle = handle.clone();
        let ticket = ticket.clone();
        let service = Arc::clone(&service);
        let context = Arc::clone(context);

        runtime.spawn(async move {
            let success = match show_current_location(&context, service.as_ref()).await {
                Ok(place) => {
                    info!(plugin_id = PLUGIN_ID, position = %place.position, "Current location shown");
                    true
                }
                Err(e) => {
                    warn!(plugin_id = PLUGIN_ID, error = %e, "Could not show current location");
                    context.log(&format!("{PLUGIN_ID}: {e}"));
                    false
                }
            };

            if let Some(loader) = handle.upgrade() {
                if let Err(e) = loader.report(&ticket, success) {
                    warn!(plugin_id = PLUGIN_ID, error = %e, "Outcome not recorded");
                }
            }
        });

        Ok(())
    })
}

/// Fetches the current location and adds its marker, map center and
/// "Find me" control.
pub async fn show_current_location(
    context: &MapContext,
    service: &dyn LocationService,
) -> AppResult<Place> {
    let report = service.current_location().await?;
    let position = LatLng::try_new(report.coordinates[0], report.coordinates[1])?;

    let place = Place {
        label: report.date_label().to_string(),
        icon_url: context.trip.location_icon_url.clone(),
        position,
        min_zoom: Some(MIN_ZOOM),
    };

    context.map.add_place(place.clone());
    context.map.center_on(position);
    context.map.add_control(MapControl {
        icon_url: FIND_ME_ICON.to_string(),
        title: FIND_ME_TITLE.to_string(),
        action: ControlAction::FitBounds(LatLngBounds::around(position, FIND_ME_MARGIN)),
    });

    Ok(place)
}
