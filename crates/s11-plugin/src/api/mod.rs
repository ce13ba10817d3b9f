//! Host-facing helpers shared by the loader and plugins.

pub mod debug_log;
