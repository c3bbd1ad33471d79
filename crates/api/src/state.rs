use std::sync::Arc;

use roiview_core::dataset::DatasetSource;
use roiview_core::disabled::DisabledRegions;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Where the encrypted annotation dataset lives and its key secret.
    pub dataset: Arc<DatasetSource>,
    /// Regions disabled by reviewers, shared across all requests.
    pub disabled: Arc<DisabledRegions>,
}

impl AppState {
    /// Build state with a fresh, empty disabled-region set.
    pub fn new(config: ServerConfig) -> Self {
        let dataset = Arc::new(config.dataset_source());
        Self {
            config: Arc::new(config),
            dataset,
            disabled: Arc::new(DisabledRegions::new()),
        }
    }
}
