//! Plugin loader — central registry of plugin callbacks and their states.
//!
//! Plugins register a callback at any time. When the host calls
//! [`PluginLoader::initialize`], the shared application data is dispatched
//! to every registered plugin in registration order; plugins registered
//! afterwards receive it immediately inside [`PluginLoader::register`].
//! Each plugin later reports whether its (possibly asynchronous) setup
//! succeeded through [`PluginLoader::report_outcome`], or through
//! [`PluginLoader::report`] with the [`PluginTicket`] it was dispatched
//! with, which keeps a replaced registration from settling its successor.
//!
//! The registry lock is never held while a callback runs, so callbacks may
//! call back into the loader.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use s11_core::error::AppError;
use s11_core::result::AppResult;

use crate::host::PluginHost;
use crate::state::PluginState;

/// Initialization callback of a plugin, with the ticket of the
/// registration being dispatched.
pub type PluginCallback<D> = Arc<dyn Fn(&Arc<D>, &PluginTicket) -> AppResult<()> + Send + Sync>;

/// Identifies one registration of a plugin.
///
/// Handed to callbacks registered with [`PluginLoader::register_with_ticket`].
/// Outcomes reported with a ticket only apply while that registration is
/// still the current one for its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginTicket {
    id: String,
    generation: u64,
}

impl PluginTicket {
    /// Plugin id the ticket was issued for.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Snapshot of a plugin's registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin identifier.
    pub id: String,
    /// Current lifecycle state.
    pub state: PluginState,
    /// When the current registration was made.
    pub registered_at: DateTime<Utc>,
    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

/// Entry in the plugin registry.
struct PluginEntry<D> {
    id: String,
    callback: PluginCallback<D>,
    /// Bumped on every registration of this id.
    generation: u64,
    state: PluginState,
    registered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<D> PluginEntry<D> {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: self.id.clone(),
            state: self.state,
            registered_at: self.registered_at,
            updated_at: self.updated_at,
        }
    }
}

struct LoaderInner<D> {
    /// Registrations in insertion order.
    entries: Vec<PluginEntry<D>>,
    /// Application data, set once by `initialize`.
    data: Option<Arc<D>>,
    next_generation: u64,
}

impl<D> LoaderInner<D> {
    fn entry_mut(&mut self, id: &str) -> Option<&mut PluginEntry<D>> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

/// Registry of plugin callbacks with per-plugin lifecycle tracking.
pub struct PluginLoader<D: PluginHost> {
    inner: Mutex<LoaderInner<D>>,
    /// Signalled whenever a plugin reports its outcome.
    settled: Notify,
}

impl<D: PluginHost> PluginLoader<D> {
    /// Creates an empty, uninitialized loader.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LoaderInner {
                entries: Vec::new(),
                data: None,
                next_generation: 0,
            }),
            settled: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoaderInner<D>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a plugin callback under `id`.
    ///
    /// Registering an id twice replaces the earlier callback and resets its
    /// state. If the loader is already initialized the callback runs right
    /// away, before this method returns; its error is returned as is.
    pub fn register<F>(&self, id: impl Into<String>, callback: F) -> AppResult<()>
    where
        F: Fn(&Arc<D>) -> AppResult<()> + Send + Sync + 'static,
    {
        self.register_with_ticket(id, move |data: &Arc<D>, _: &PluginTicket| callback(data))
    }

    /// Like [`register`](Self::register), but the callback also receives the
    /// ticket of this registration. Plugins that settle asynchronously report
    /// through [`report`](Self::report) with it, so an outcome from a
    /// replaced registration is dropped instead of settling the new one.
    pub fn register_with_ticket<F>(&self, id: impl Into<String>, callback: F) -> AppResult<()>
    where
        F: Fn(&Arc<D>, &PluginTicket) -> AppResult<()> + Send + Sync + 'static,
    {
        let id = id.into();
        let callback: PluginCallback<D> = Arc::new(callback);
        let now = Utc::now();

        let data = {
            let mut inner = self.lock();
            inner.next_generation += 1;
            let generation = inner.next_generation;
            match inner.entry_mut(&id) {
                Some(entry) => {
                    debug!(plugin_id = %id, previous = %entry.state, "Replacing plugin registration");
                    entry.callback = callback;
                    entry.generation = generation;
                    entry.state = PluginState::Registered;
                    entry.registered_at = now;
                    entry.updated_at = now;
                }
                None => inner.entries.push(PluginEntry {
                    id: id.clone(),
                    callback,
                    generation,
                    state: PluginState::Registered,
                    registered_at: now,
                    updated_at: now,
                }),
            }
            inner.data.clone()
        };

        self.announce(&id, PluginState::Registered, data.as_deref());

        if data.is_some() {
            // Late registration: the host is already up.
            self.dispatch(&id)?;
        }

        Ok(())
    }

    /// Stores the application data and dispatches it to every registered
    /// plugin, in registration order.
    ///
    /// The loader accepts a single initialization; later calls fail with a
    /// conflict and leave data and states untouched. A callback error stops
    /// the pass: plugins after it stay `REGISTERED`.
    pub fn initialize(&self, data: Arc<D>) -> AppResult<()> {
        let ids: Vec<String> = {
            let mut inner = self.lock();
            if inner.data.is_some() {
                warn!("Plugin loader initialized twice; ignoring");
                return Err(AppError::conflict("Plugin loader is already initialized"));
            }
            inner.data = Some(Arc::clone(&data));
            inner.entries.iter().map(|e| e.id.clone()).collect()
        };

        info!(plugins = ids.len(), "Initialized plugin loader");
        data.log("Initialized plugin loader");
        self.log_plugin_list();

        for id in &ids {
            self.dispatch(id)?;
        }

        Ok(())
    }

    /// Records the final outcome of a plugin's load attempt.
    ///
    /// Fails with not-found for an unknown id and with a conflict when the
    /// plugin is not `LOADING`; the state is unchanged in both cases.
    pub fn report_outcome(&self, id: &str, success: bool) -> AppResult<()> {
        self.settle(id, None, success)
    }

    /// Records the outcome of the registration `ticket` was issued for.
    ///
    /// A ticket from a registration that has since been replaced is
    /// ignored: the call succeeds and no state changes. Otherwise this
    /// behaves like [`report_outcome`](Self::report_outcome).
    pub fn report(&self, ticket: &PluginTicket, success: bool) -> AppResult<()> {
        self.settle(&ticket.id, Some(ticket.generation), success)
    }

    fn settle(&self, id: &str, generation: Option<u64>, success: bool) -> AppResult<()> {
        let (state, data) = {
            let mut inner = self.lock();
            let data = inner.data.clone();
            let entry = inner
                .entry_mut(id)
                .ok_or_else(|| AppError::not_found(format!("Plugin '{id}' is not registered")))?;

            if generation.is_some_and(|g| g != entry.generation) {
                debug!(plugin_id = %id, success, "Ignoring outcome of a replaced registration");
                return Ok(());
            }

            let next = entry.state.settle(success).map_err(|e| {
                warn!(plugin_id = %id, state = %entry.state, success, "Rejected plugin outcome");
                e
            })?;
            entry.state = next;
            entry.updated_at = Utc::now();
            (next, data)
        };

        self.announce(id, state, data.as_deref());
        self.settled.notify_waiters();
        Ok(())
    }

    /// Renders every plugin and its state in registration order:
    /// `"Plugins: <id>:<STATE>, <id>:<STATE>, "`.
    pub fn list_plugins(&self) -> String {
        let inner = self.lock();
        let mut message = String::from("Plugins: ");
        for entry in &inner.entries {
            message.push_str(&entry.id);
            message.push(':');
            message.push_str(entry.state.as_str());
            message.push_str(", ");
        }
        message
    }

    /// Writes the plugin listing to the host log. No-op before
    /// initialization.
    pub fn log_plugin_list(&self) {
        let data = self.lock().data.clone();
        if let Some(data) = data {
            data.log(&self.list_plugins());
        }
    }

    /// Returns the state of a plugin, if registered.
    pub fn state(&self, id: &str) -> Option<PluginState> {
        self.lock()
            .entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.state)
    }

    /// Returns a snapshot of every registration, in registration order.
    pub fn plugins(&self) -> Vec<PluginInfo> {
        self.lock().entries.iter().map(PluginEntry::info).collect()
    }

    /// Returns the ids of plugins still waiting to report an outcome.
    pub fn pending(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.state == PluginState::Loading)
            .map(|e| e.id.clone())
            .collect()
    }

    /// Returns whether the application data has been dispatched.
    pub fn is_initialized(&self) -> bool {
        self.lock().data.is_some()
    }

    /// Returns the application data, once initialized.
    pub fn data(&self) -> Option<Arc<D>> {
        self.lock().data.clone()
    }

    /// Waits until no plugin is `LOADING`.
    ///
    /// Never times out on its own; plugins that never report keep this
    /// pending.
    pub async fn wait_settled(&self) {
        loop {
            let notified = self.settled.notified();
            if self.pending().is_empty() {
                return;
            }
            notified.await;
        }
    }

    /// Moves a `REGISTERED` plugin to `LOADING` and runs its callback.
    fn dispatch(&self, id: &str) -> AppResult<()> {
        let (callback, ticket, data) = {
            let mut inner = self.lock();
            let Some(data) = inner.data.clone() else {
                return Ok(());
            };
            let Some(entry) = inner.entry_mut(id) else {
                return Ok(());
            };
            // Already dispatched, e.g. re-registered by an earlier callback.
            let Ok(next) = entry.state.begin_loading() else {
                return Ok(());
            };
            entry.state = next;
            entry.updated_at = Utc::now();
            let ticket = PluginTicket {
                id: entry.id.clone(),
                generation: entry.generation,
            };
            (Arc::clone(&entry.callback), ticket, data)
        };

        self.announce(id, PluginState::Loading, Some(&data));

        callback(&data, &ticket).map_err(|e| {
            error!(plugin_id = %id, error = %e, "Plugin callback failed");
            e
        })
    }

    fn announce(&self, id: &str, state: PluginState, data: Option<&D>) {
        info!(plugin_id = %id, state = %state, "Plugin state changed");
        if let Some(data) = data {
            data.log(&format!("{id}: {state}"));
        }
    }
}

impl<D: PluginHost> Default for PluginLoader<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PluginHost> fmt::Debug for PluginLoader<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("PluginLoader")
            .field("initialized", &inner.data.is_some())
            .field(
                "plugins",
                &inner
                    .entries
                    .iter()
                    .map(|e| (e.id.as_str(), e.state))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::debug_log::DebugLog;
    use s11_core::error::ErrorKind;

    fn ok_callback(_: &Arc<DebugLog>) -> AppResult<()> {
        Ok(())
    }

    #[test]
    fn test_listing_follows_lifecycle() {
        let loader = PluginLoader::<DebugLog>::new();
        loader.register("plugin1", ok_callback).expect("register");
        loader.register("plugin2", ok_callback).expect("register");
        assert_eq!(
            loader.list_plugins(),
            "Plugins: plugin1:REGISTERED, plugin2:REGISTERED, "
        );

        loader.initialize(Arc::new(DebugLog::new())).expect("init");
        assert_eq!(
            loader.list_plugins(),
            "Plugins: plugin1:LOADING, plugin2:LOADING, "
        );

        loader.report_outcome("plugin1", true).expect("outcome");
        loader.report_outcome("plugin2", false).expect("outcome");
        assert_eq!(
            loader.list_plugins(),
            "Plugins: plugin1:ACTIVE, plugin2:FAILED, "
        );
        assert_eq!(loader.list_plugins(), loader.list_plugins());
    }

    #[test]
    fn test_empty_listing() {
        let loader = PluginLoader::<DebugLog>::default();
        assert_eq!(loader.list_plugins(), "Plugins: ");
        assert!(!loader.is_initialized());
        assert!(loader.data().is_none());

        // Nothing to write to yet
        loader.log_plugin_list();
        assert!(!loader.is_initialized());

        let log = Arc::new(DebugLog::new());
        loader.initialize(Arc::clone(&log)).expect("init");
        assert_eq!(log.history(), vec!["Initialized plugin loader", "Plugins: "]);
    }

    #[test]
    fn test_initialize_logs_startup_and_listing() {
        let loader = PluginLoader::<DebugLog>::new();
        loader.register("helpControl", ok_callback).expect("register");

        let log = Arc::new(DebugLog::new());
        loader.initialize(Arc::clone(&log)).expect("init");

        assert_eq!(
            log.history(),
            vec![
                "Initialized plugin loader",
                "Plugins: helpControl:REGISTERED, ",
                "helpControl: LOADING",
            ]
        );
    }

    #[test]
    fn test_state_changes_are_logged_after_initialize() {
        let loader = PluginLoader::<DebugLog>::new();
        let log = Arc::new(DebugLog::new());
        loader.initialize(Arc::clone(&log)).expect("init");

        loader.register("photoFeed", ok_callback).expect("register");
        loader.report_outcome("photoFeed", true).expect("outcome");

        assert!(log.contains("photoFeed: REGISTERED"));
        assert!(log.contains("photoFeed: LOADING"));
        assert!(log.contains("photoFeed: ACTIVE"));
    }

    #[test]
    fn test_second_initialize_is_rejected() {
        let loader = PluginLoader::<DebugLog>::new();
        loader.register("plugin1", ok_callback).expect("register");

        let first = Arc::new(DebugLog::new());
        loader.initialize(Arc::clone(&first)).expect("init");
        loader.report_outcome("plugin1", true).expect("outcome");

        let err = loader
            .initialize(Arc::new(DebugLog::new()))
            .expect_err("second init");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(loader.state("plugin1"), Some(PluginState::Active));
        let data = loader.data().expect("data");
        assert!(Arc::ptr_eq(&data, &first));
    }

    #[test]
    fn test_report_outcome_errors() {
        let loader = PluginLoader::<DebugLog>::new();
        loader.register("plugin1", ok_callback).expect("register");

        let err = loader.report_outcome("missing", true).expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::NotFound);

        // Not dispatched yet
        let err = loader.report_outcome("plugin1", true).expect_err("early");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(loader.state("plugin1"), Some(PluginState::Registered));

        loader.initialize(Arc::new(DebugLog::new())).expect("init");
        loader.report_outcome("plugin1", false).expect("outcome");

        // Settled states are final
        let err = loader.report_outcome("plugin1", true).expect_err("twice");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(loader.state("plugin1"), Some(PluginState::Failed));
    }

    #[test]
    fn test_pending_and_snapshot() {
        let loader = PluginLoader::<DebugLog>::new();
        loader.register("a", ok_callback).expect("register");
        loader.register("b", ok_callback).expect("register");
        assert!(loader.pending().is_empty());

        loader.initialize(Arc::new(DebugLog::new())).expect("init");
        assert_eq!(loader.pending(), vec!["a", "b"]);

        loader.report_outcome("a", true).expect("outcome");
        assert_eq!(loader.pending(), vec!["b"]);

        let infos = loader.plugins();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].id, "a");
        assert_eq!(infos[0].state, PluginState::Active);
        assert!(infos[0].updated_at >= infos[0].registered_at);
        assert_eq!(infos[1].state, PluginState::Loading);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let loader = PluginLoader::<DebugLog>::new();
        let tickets = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let tickets = Arc::clone(&tickets);
            loader
                .register_with_ticket("photoFeed", move |_: &Arc<DebugLog>, ticket: &PluginTicket| {
                    tickets.lock().expect("lock").push(ticket.clone());
                    Ok(())
                })
                .expect("register");
        }

        let log = Arc::new(DebugLog::new());
        loader.initialize(Arc::clone(&log)).expect("init");
        let current = tickets.lock().expect("lock")[0].clone();
        assert_eq!(current.id(), "photoFeed");

        loader.register("photoFeed", ok_callback).expect("register");
        assert_eq!(loader.state("photoFeed"), Some(PluginState::Loading));

        loader.report(&current, true).expect("stale report");
        assert_eq!(loader.state("photoFeed"), Some(PluginState::Loading));
        assert!(!log.contains("photoFeed: ACTIVE"));

        let err = loader
            .report(
                &PluginTicket {
                    id: "missing".to_string(),
                    generation: 1,
                },
                true,
            )
            .expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_debug_output_lists_states() {
        let loader = PluginLoader::<DebugLog>::new();
        loader.register("a", ok_callback).expect("register");
        let rendered = format!("{loader:?}");
        assert!(rendered.contains("initialized: false"));
        assert!(rendered.contains("Registered"));
    }
}
