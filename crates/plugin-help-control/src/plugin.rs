//! Plugin registration and about window content.

use std::sync::Arc;

use tracing::debug;

use s11_core::config::trip::TripConfig;
use s11_core::error::AppError;
use s11_core::result::AppResult;
use s11_map::{ControlAction, MapContext, MapControl};
use s11_plugin::PluginLoader;

/// Plugin identifier.
pub const PLUGIN_ID: &str = "helpControl";

const HELP_TITLE: &str = "What is this all about?";
const HELP_ICON: &str =
    "https://drive.google.com/uc?export=download&id=0B48vYXs63P2lbUFBeFRYX2g5ZDA";
const TRIP_POST_SLUG: &str = "a-hundred-tickets-to-bangkok";

/// Registers the help control with the loader. Setup is synchronous, so
/// the plugin reports `ACTIVE` from within its callback.
pub fn register(loader: &Arc<PluginLoader<MapContext>>) -> AppResult<()> {
    let handle = Arc::downgrade(loader);

    loader.register(PLUGIN_ID, move |context: &Arc<MapContext>| {
        context.map.set_help_text(&about_text(&context.trip));
        context.map.add_control(MapControl {
            icon_url: HELP_ICON.to_string(),
            title: HELP_TITLE.to_string(),
            action: ControlAction::ToggleHelp,
        });
        debug!(plugin_id = PLUGIN_ID, "Help control added");

        let loader = handle
            .upgrade()
            .ok_or_else(|| AppError::internal("Plugin loader dropped"))?;
        loader.report_outcome(PLUGIN_ID, true)
    })
}

/// HTML shown in the about window.
pub fn about_text(trip: &TripConfig) -> String {
    let post_url = format!(
        "{}/{TRIP_POST_SLUG}",
        trip.blog_base_url.trim_end_matches('/')
    );

    format!(
        "This website is about my trip \"{name}\". You can read a \
         <a href='{post_url}' class='more-link'>blog post</a> for more info about the trip.<br>\
         <p>You can use the map to look at the route that I am taking, the places I have been to, \
         photos, and a lot more. Many items on the map are clickable and show you some info or \
         pictures. Sometimes there is also a corresponding blog post, which will be loaded when \
         you click the 'Continue Reading' link.\
         <p>The map shows the route I have already travelled and the route that I am planning to \
         take, and the 'Find me' button on the top of the map shows the place where I am right now.",
        name = trip.name,
    )
}
