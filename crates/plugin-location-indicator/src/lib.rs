//! Location indicator plugin for the S11 map.
//!
//! Fetches the last known location from an external service, marks it on
//! the map and adds a "Find me" control that zooms to it.

pub mod plugin;
pub mod service;

pub use plugin::{PLUGIN_ID, register, show_current_location};
pub use service::{HttpLocationService, LocationReport, LocationService};
