//! # s11-map
//!
//! The application data shared with every S11 plugin:
//!
//! - [`MapContext`]: debug log, map surface, trip options and HTTP client
//! - [`MapSurface`]: the overlay operations plugins may perform
//! - [`HeadlessMap`]: a surface that records overlays instead of drawing
//! - Geographic value types

pub mod context;
pub mod geo;
pub mod surface;

pub use context::MapContext;
pub use geo::{LatLng, LatLngBounds};
pub use surface::{
    ControlAction, HeadlessMap, MapControl, MapOverlay, MapSurface, PhotoMarker, Place,
};
