//! Debug log — in-memory message sink standing in for the map's debug window.
//!
//! Messages written before the window is attached are buffered; once
//! attached, every message (buffered ones included) is visible, newest
//! first. Every message is also emitted as a `tracing` event.

use std::sync::Mutex;

use tracing::info;

use crate::host::PluginHost;

/// In-memory debug log.
#[derive(Debug, Default)]
pub struct DebugLog {
    inner: Mutex<DebugLogInner>,
}

#[derive(Debug, Default)]
struct DebugLogInner {
    /// Whether the debug window is shown.
    attached: bool,
    /// All messages, oldest first.
    messages: Vec<String>,
}

impl DebugLog {
    /// Creates a detached, empty debug log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a debug log that is shown from the start.
    pub fn attached() -> Self {
        let log = Self::new();
        log.attach();
        log
    }

    /// Appends a message.
    pub fn write(&self, message: &str) {
        info!(target: "s11::debug", "{}", message);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.messages.push(message.to_string());
    }

    /// Shows the debug window, flushing any buffered messages into it.
    pub fn attach(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.attached = true;
    }

    /// Returns whether the debug window is shown.
    pub fn is_attached(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).attached
    }

    /// Messages shown in the debug window, newest first. Empty while detached.
    pub fn visible(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !inner.attached {
            return Vec::new();
        }
        inner.messages.iter().rev().cloned().collect()
    }

    /// Messages waiting for the window to be attached, oldest first.
    pub fn buffered(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.attached {
            return Vec::new();
        }
        inner.messages.clone()
    }

    /// Every message written so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .messages
            .clone()
    }

    /// Returns whether any message equals `message`.
    pub fn contains(&self, message: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .messages
            .iter()
            .any(|m| m == message)
    }
}

impl PluginHost for DebugLog {
    fn log(&self, message: &str) {
        self.write(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffers_until_attached() {
        let log = DebugLog::new();
        log.write("first");
        log.write("second");

        assert!(log.visible().is_empty());
        assert_eq!(log.buffered(), vec!["first", "second"]);

        log.attach();
        log.write("third");

        assert!(log.buffered().is_empty());
        assert_eq!(log.visible(), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_history_is_oldest_first() {
        let log = DebugLog::attached();
        log.log("a");
        log.log("b");
        assert_eq!(log.history(), vec!["a", "b"]);
        assert!(log.contains("b"));
        assert!(!log.contains("c"));
    }
}
