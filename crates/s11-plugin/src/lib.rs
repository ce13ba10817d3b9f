//! # s11-plugin
//!
//! Plugin framework for the S11 travel map. Provides:
//!
//! - A plugin loader that maps plugin ids to initialization callbacks
//! - Per-plugin lifecycle tracking (registered, loading, active, failed)
//! - Dispatch of the shared application data once the host is ready,
//!   or immediately for plugins registered late
//! - A debug log sink that mirrors the loader's messages

pub mod api;
pub mod host;
pub mod loader;
pub mod state;

pub use api::debug_log::DebugLog;
pub use host::PluginHost;
pub use loader::{PluginCallback, PluginInfo, PluginLoader, PluginTicket};
pub use state::PluginState;
