pub mod hub;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config::AppConfig, dao::queue_store::QueueStore};

pub use self::hub::{ViewerConnection, ViewerHub};

/// Cheaply cloneable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Central application state: store handle, configuration, the viewer hub
/// and the write gate serializing mutating operations.
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn QueueStore>,
    hub: ViewerHub,
    write_gate: Mutex<()>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, store: Arc<dyn QueueStore>) -> SharedState {
        Arc::new(Self {
            config,
            store,
            hub: ViewerHub::new(),
            write_gate: Mutex::new(()),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle on the queue store.
    pub fn store(&self) -> &Arc<dyn QueueStore> {
        &self.store
    }

    /// Registry of live display connections.
    pub fn hub(&self) -> &ViewerHub {
        &self.hub
    }

    /// Gate serializing every check-then-act sequence against the store.
    ///
    /// Snapshot assembly takes the same gate, so a pushed frame never mixes
    /// the queue state of one commit with the rankings of another. Mutators
    /// release it before broadcasting; the broadcast re-acquires it.
    pub fn write_gate(&self) -> &Mutex<()> {
        &self.write_gate
    }
}
