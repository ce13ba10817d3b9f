//! Help control plugin for the S11 map.
//!
//! Fills the about window and adds the control button that toggles it.

pub mod plugin;

pub use plugin::{PLUGIN_ID, about_text, register};
