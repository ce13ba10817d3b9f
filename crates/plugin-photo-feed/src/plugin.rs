//! Plugin registration and photo marker placement.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use s11_core::error::AppError;
use s11_core::result::AppResult;
use s11_map::{LatLng, MapContext, PhotoMarker};
use s11_plugin::{PluginHost, PluginLoader, PluginTicket};

use crate::feed::{FeedItem, PhotoFeedService};

/// Plugin identifier.
pub const PLUGIN_ID: &str = "photoFeed";

/// Registers the photo feed with the loader.
///
/// The legend is shown as soon as the plugin is dispatched. Feeds are then
/// loaded concurrently in a background task; the plugin reports `ACTIVE`
/// if at least one feed loaded and `FAILED` if all of them failed.
pub fn register(
    loader: &Arc<PluginLoader<MapContext>>,
    service: Arc<dyn PhotoFeedService>,
) -> AppResult<()> {
    let handle = Arc::downgrade(loader);

    loader.register_with_ticket(PLUGIN_ID, move |context: &Arc<MapContext>, ticket: &PluginTicket| {
        if !context.trip.legend.is_empty() {
            context.map.show_legend(&context.trip.legend);
        }

        let tags: Vec<String> = context
            .trip
            .photo_tags()
            .into_iter()
            .map(str::to_string)
            .collect();

        if tags.is_empty() {
            info!(plugin_id = PLUGIN_ID, "No photo tags configured");
            let loader = handle
                .upgrade()
                .ok_or_else(|| AppError::internal("Plugin loader dropped"))?;
            return loader.report(ticket, true);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            AppError::plugin(format!("{PLUGIN_ID} needs a tokio runtime: {e}"))
        })?;

        let handle = handle.clone();
        let ticket = ticket.clone();
        let service = Arc::clone(&service);
        let context = Arc::clone(context);

        runtime.spawn(async move {
            let results = join_all(
                tags.iter()
                    .map(|tag| load_tag(&context, service.as_ref(), tag)),
            )
            .await;

            let mut loaded = 0;
            for (tag, result) in tags.iter().zip(&results) {
                match result {
                    Ok(count) => {
                        info!(plugin_id = PLUGIN_ID, tag = %tag, photos = count, "Photo feed loaded");
                        loaded += 1;
                    }
                    Err(e) => {
                        warn!(plugin_id = PLUGIN_ID, tag = %tag, error = %e, "Photo feed failed");
                        context.log(&format!("{PLUGIN_ID}: feed '{tag}' failed: {e}"));
                    }
                }
            }

            if let Some(loader) = handle.upgrade() {
                if let Err(e) = loader.report(&ticket, loaded > 0) {
                    warn!(plugin_id = PLUGIN_ID, error = %e, "Outcome not recorded");
                }
            }
        });

        Ok(())
    })
}

/// Loads the feed for one tag and adds its photos to the map. Returns the
/// number of markers placed.
pub async fn load_tag(
    context: &MapContext,
    service: &dyn PhotoFeedService,
    tag: &str,
) -> AppResult<usize> {
    let items = service.fetch_tag(tag).await?;

    let mut placed = 0;
    for item in &items {
        match photo_marker(item, &context.trip.legend) {
            Some(marker) => {
                context.map.add_photo_marker(marker);
                placed += 1;
            }
            None => warn!(plugin_id = PLUGIN_ID, link = %item.link, "Skipping photo without position"),
        }
    }

    Ok(placed)
}

/// Builds the marker for a feed entry, or `None` when the entry has no
/// usable position.
pub fn photo_marker(item: &FeedItem, legend: &BTreeMap<String, String>) -> Option<PhotoMarker> {
    let lat = item.latitude.as_ref()?.value()?;
    let lng = item.longitude.as_ref()?.value()?;
    let position = LatLng::try_new(lat, lng).ok()?;

    let tag = extract_legend_tag(&item.tags, legend);
    let color = tag.and_then(|t| legend.get(t)).cloned();

    Some(PhotoMarker {
        position,
        picture_url: item.media.m.clone(),
        link: item.link.clone(),
        taken_at: item.date_taken.clone(),
        tag: tag.map(str::to_string),
        color,
    })
}

/// Picks the legend entry a photo belongs to: the last of its
/// space-separated tags that appears in the legend.
pub fn extract_legend_tag<'a>(tags: &'a str, legend: &BTreeMap<String, String>) -> Option<&'a str> {
    tags.split(' ').rev().find(|tag| legend.contains_key(*tag))
}
