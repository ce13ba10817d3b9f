//! Photo feed plugin for the S11 map.
//!
//! Loads one geotagged photo feed per configured tag and puts every photo
//! on the map as a marker colored after the trip legend.

pub mod feed;
pub mod plugin;

pub use feed::{FeedItem, HttpPhotoFeed, PhotoFeedService};
pub use plugin::{PLUGIN_ID, extract_legend_tag, load_tag, photo_marker, register};
