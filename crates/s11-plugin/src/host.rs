//! The loader's view of the shared application data.

/// Shared application data handed to every plugin callback.
///
/// The loader treats the data as opaque: it only stores a reference and
/// writes its own status messages through [`PluginHost::log`]. Hosts put
/// whatever collaborators their plugins need (map handle, configuration,
/// HTTP clients) on the implementing type.
pub trait PluginHost: Send + Sync + 'static {
    /// Writes a human-readable message to the host's log.
    fn log(&self, message: &str);
}
