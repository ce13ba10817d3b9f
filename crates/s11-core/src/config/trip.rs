//! Trip options shared with every plugin.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-trip options: initial viewport, photo feed settings, legend and the
/// external services the built-in plugins talk to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripConfig {
    /// Trip title.
    #[serde(default = "default_name")]
    pub name: String,
    /// Initial map center as `[longitude, latitude]` (GeoJSON order).
    #[serde(default = "default_init_center")]
    pub init_center: [f64; 2],
    /// Initial zoom level.
    #[serde(default = "default_init_zoom")]
    pub init_zoom: u8,
    /// Flickr account whose geotagged photos are shown.
    #[serde(default)]
    pub flickr_id: String,
    /// Comma-separated photo tags; one feed is fetched per tag.
    #[serde(default)]
    pub flickr_tags: String,
    /// Legend: photo tag → marker color.
    #[serde(default)]
    pub legend: BTreeMap<String, String>,
    /// Endpoint returning the last known location.
    #[serde(default = "default_location_service_url")]
    pub location_service_url: String,
    /// Icon used for the current-location marker.
    #[serde(default = "default_location_icon_url")]
    pub location_icon_url: String,
    /// Base URL of the geotagged photo feed.
    #[serde(default = "default_photo_feed_url")]
    pub photo_feed_url: String,
    /// Base URL of the blog the map belongs to.
    #[serde(default = "default_blog_base_url")]
    pub blog_base_url: String,
}

impl TripConfig {
    /// Returns the configured photo tags, trimmed, without empty entries.
    pub fn photo_tags(&self) -> Vec<&str> {
        self.flickr_tags
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            init_center: default_init_center(),
            init_zoom: default_init_zoom(),
            flickr_id: String::new(),
            flickr_tags: String::new(),
            legend: BTreeMap::new(),
            location_service_url: default_location_service_url(),
            location_icon_url: default_location_icon_url(),
            photo_feed_url: default_photo_feed_url(),
            blog_base_url: default_blog_base_url(),
        }
    }
}

fn default_name() -> String {
    "A hundred tickets to Bangkok".to_string()
}

fn default_init_center() -> [f64; 2] {
    [8.68, 50.11]
}

fn default_init_zoom() -> u8 {
    4
}

fn default_location_service_url() -> String {
    "https://big-vertex-117210.appspot.com/location/current".to_string()
}

fn default_location_icon_url() -> String {
    "http://www.penceland.com/images/google_map_man.gif".to_string()
}

fn default_photo_feed_url() -> String {
    "https://api.flickr.com/services/feeds/geo/".to_string()
}

fn default_blog_base_url() -> String {
    "http://localhost/wordpress/".to_string()
}
