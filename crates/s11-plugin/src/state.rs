//! Plugin lifecycle states and their transitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use s11_core::error::AppError;
use s11_core::result::AppResult;

/// Lifecycle state of a single plugin.
///
/// ```text
/// REGISTERED --(dispatch)--> LOADING --(outcome ok)----> ACTIVE
///                                    --(outcome fail)--> FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PluginState {
    /// Callback stored, application data not dispatched yet.
    Registered,
    /// Callback invoked, waiting for the plugin to report its outcome.
    Loading,
    /// The plugin reported a successful load.
    Active,
    /// The plugin reported a failed load.
    Failed,
    /// Reserved. No loader operation produces this state.
    Inactive,
}

impl PluginState {
    /// Returns the state name as rendered in plugin listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::Loading => "LOADING",
            Self::Active => "ACTIVE",
            Self::Failed => "FAILED",
            Self::Inactive => "INACTIVE",
        }
    }

    /// Returns whether the plugin has reported its final outcome.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Active | Self::Failed)
    }

    /// Transition taken when the application data is dispatched.
    pub fn begin_loading(self) -> AppResult<Self> {
        match self {
            Self::Registered => Ok(Self::Loading),
            other => Err(AppError::conflict(format!(
                "Cannot dispatch to a plugin in state {other}"
            ))),
        }
    }

    /// Transition taken when the plugin reports its outcome.
    pub fn settle(self, success: bool) -> AppResult<Self> {
        match self {
            Self::Loading if success => Ok(Self::Active),
            Self::Loading => Ok(Self::Failed),
            other => Err(AppError::conflict(format!(
                "Cannot report an outcome for a plugin in state {other}"
            ))),
        }
    }
}

impl fmt::Display for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PluginState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTERED" => Ok(Self::Registered),
            "LOADING" => Ok(Self::Loading),
            "ACTIVE" => Ok(Self::Active),
            "FAILED" => Ok(Self::Failed),
            "INACTIVE" => Ok(Self::Inactive),
            other => Err(AppError::validation(format!(
                "Unknown plugin state '{other}'"
            ))),
        }
    }
}
