//! Application state for the web layer.

use std::sync::Arc;

use crate::catalog::StationIndex;
use crate::collector::Collector;
use crate::config::ServerConfig;
use crate::orchestrator::Orchestrator;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Station catalog used to locate gates
    pub index: Arc<StationIndex>,

    /// Batch orchestrator over the configured collector
    pub orchestrator: Arc<Orchestrator<Collector>>,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        index: StationIndex,
        orchestrator: Orchestrator<Collector>,
        config: ServerConfig,
    ) -> Self {
        Self {
            index: Arc::new(index),
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }
}
