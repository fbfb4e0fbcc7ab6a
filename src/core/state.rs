// Application state (AppState)

use crate::core::config::Config;
use crate::metrics::collector::Metrics;
use crate::policy::PeerHandoutPolicy;
use crate::storage::{MemoryStorage, Storage};
use std::sync::Arc;

/// Shared application state
///
/// Everything a handler touches is injected here; handlers hold no state of
/// their own between requests.
#[derive(Clone)]
pub struct AppState {
    /// Peer, torrent and manifest records
    pub storage: Arc<dyn Storage>,

    /// Set when `storage` is the in-process backend, for peer counts and reaping
    pub memory: Option<Arc<MemoryStorage>>,

    /// Peer handout policy, resolved once from configuration
    pub policy: Arc<PeerHandoutPolicy>,

    pub metrics: Arc<Metrics>,

    pub config: Arc<Config>,
}

impl AppState {
    /// State over an externally provided storage backend
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        let policy = PeerHandoutPolicy::new(&config.peer_handout);

        Self {
            storage,
            memory: None,
            policy: Arc::new(policy),
            metrics: Arc::new(Metrics::new()),
            config: Arc::new(config),
        }
    }

    /// State over a fresh in-memory backend
    pub fn with_memory_storage(config: Config) -> Self {
        let memory = Arc::new(MemoryStorage::new());
        let storage: Arc<dyn Storage> = memory.clone();

        Self {
            memory: Some(memory),
            ..Self::new(config, storage)
        }
    }
}
