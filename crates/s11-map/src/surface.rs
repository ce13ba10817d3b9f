//! Map surface — the overlay operations available to plugins.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{LatLng, LatLngBounds};

/// A labelled marker on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Text shown in the marker's info window.
    pub label: String,
    /// Marker icon.
    pub icon_url: String,
    /// Marker position.
    pub position: LatLng,
    /// Marker is hidden below this zoom level.
    pub min_zoom: Option<u8>,
}

/// A photo marker linking to the photo page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoMarker {
    /// Marker position.
    pub position: LatLng,
    /// Thumbnail URL.
    pub picture_url: String,
    /// Photo page URL.
    pub link: String,
    /// When the photo was taken, as reported by the feed.
    pub taken_at: Option<String>,
    /// Legend tag the photo belongs to.
    pub tag: Option<String>,
    /// Fill color taken from the legend.
    pub color: Option<String>,
}

/// What happens when a control button is clicked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlAction {
    /// Zoom the map to the given area.
    FitBounds(LatLngBounds),
    /// Show or hide the about window.
    ToggleHelp,
}

/// A button in the map's control bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapControl {
    /// Button icon.
    pub icon_url: String,
    /// Tooltip text.
    pub title: String,
    /// Click action.
    pub action: ControlAction,
}

/// Overlay operations plugins perform on the map.
pub trait MapSurface: Send + Sync {
    /// Adds a labelled marker.
    fn add_place(&self, place: Place);

    /// Adds a photo marker.
    fn add_photo_marker(&self, marker: PhotoMarker);

    /// Adds a control bar button.
    fn add_control(&self, control: MapControl);

    /// Centers the map on a position.
    fn center_on(&self, position: LatLng);

    /// Shows the photo legend (tag → color).
    fn show_legend(&self, legend: &BTreeMap<String, String>);

    /// Sets the content of the about window.
    fn set_help_text(&self, html: &str);
}

/// An overlay recorded by [`HeadlessMap`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapOverlay {
    Place(Place),
    PhotoMarker(PhotoMarker),
    Control(MapControl),
    Center(LatLng),
    Legend(BTreeMap<String, String>),
    HelpText(String),
}

/// Map surface that records overlays instead of rendering them.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    overlays: Mutex<Vec<MapOverlay>>,
}

impl HeadlessMap {
    /// Creates an empty headless map.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, overlay: MapOverlay) {
        debug!(overlay = ?overlay, "Map overlay added");
        self.overlays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(overlay);
    }

    /// All recorded overlays, in insertion order.
    pub fn overlays(&self) -> Vec<MapOverlay> {
        self.overlays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Recorded places.
    pub fn places(&self) -> Vec<Place> {
        self.overlays()
            .into_iter()
            .filter_map(|o| match o {
                MapOverlay::Place(place) => Some(place),
                _ => None,
            })
            .collect()
    }

    /// Recorded photo markers.
    pub fn photo_markers(&self) -> Vec<PhotoMarker> {
        self.overlays()
            .into_iter()
            .filter_map(|o| match o {
                MapOverlay::PhotoMarker(marker) => Some(marker),
                _ => None,
            })
            .collect()
    }

    /// Recorded control buttons.
    pub fn controls(&self) -> Vec<MapControl> {
        self.overlays()
            .into_iter()
            .filter_map(|o| match o {
                MapOverlay::Control(control) => Some(control),
                _ => None,
            })
            .collect()
    }

    /// Last position the map was centered on.
    pub fn center(&self) -> Option<LatLng> {
        self.overlays().into_iter().rev().find_map(|o| match o {
            MapOverlay::Center(position) => Some(position),
            _ => None,
        })
    }
}

impl MapSurface for HeadlessMap {
    fn add_place(&self, place: Place) {
        self.push(MapOverlay::Place(place));
    }

    fn add_photo_marker(&self, marker: PhotoMarker) {
        self.push(MapOverlay::PhotoMarker(marker));
    }

    fn add_control(&self, control: MapControl) {
        self.push(MapOverlay::Control(control));
    }

    fn center_on(&self, position: LatLng) {
        self.push(MapOverlay::Center(position));
    }

    fn show_legend(&self, legend: &BTreeMap<String, String>) {
        self.push(MapOverlay::Legend(legend.clone()));
    }

    fn set_help_text(&self, html: &str) {
        self.push(MapOverlay::HelpText(html.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_map_records_in_order() {
        let map = HeadlessMap::new();
        map.center_on(LatLng::new(1.0, 2.0));
        map.add_place(Place {
            label: "2017-03-01".to_string(),
            icon_url: "icon.gif".to_string(),
            position: LatLng::new(13.75, 100.5),
            min_zoom: Some(8),
        });
        map.center_on(LatLng::new(13.75, 100.5));

        assert_eq!(map.overlays().len(), 3);
        assert_eq!(map.places().len(), 1);
        assert_eq!(map.center(), Some(LatLng::new(13.75, 100.5)));
        assert!(map.controls().is_empty());
        assert!(map.photo_markers().is_empty());
    }

    #[test]
    fn test_overlay_serializes() {
        let overlay = MapOverlay::Control(MapControl {
            icon_url: "help.png".to_string(),
            title: "What is this all about?".to_string(),
            action: ControlAction::ToggleHelp,
        });
        let json = serde_json::to_value(&overlay).expect("serialize");
        assert_eq!(json["Control"]["action"], "ToggleHelp");
    }
}
