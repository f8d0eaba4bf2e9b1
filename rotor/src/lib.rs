pub mod catalog;
pub mod config;
pub mod errors;
pub mod metrics_defs;
pub mod rotation;
pub mod service;
pub mod store;

#[cfg(test)]
mod testutils;

use crate::catalog::CatalogCache;
use crate::errors::RotorError;
use crate::service::{AppState, RotorService};
use crate::store::{CursorStore, RestStore};
use std::sync::Arc;

/// Builds the service state from configuration and serves it forever.
pub async fn run(config: config::Config, overrides: config::Overrides) -> Result<(), RotorError> {
    let store: Option<Arc<dyn CursorStore>> = match config.resolved_store() {
        Some(store_config) => Some(Arc::new(RestStore::new(&store_config)?)),
        None => {
            // The service still starts; every rotation request will fail
            // with setup instructions until the store is configured.
            tracing::warn!("key-value store connection parameters are not configured");
            None
        }
    };

    let state = AppState {
        overrides,
        catalog: CatalogCache::new(config.catalog_path.clone()),
        store,
    };

    shared::http::run_http_service(
        &config.listener.host,
        config.listener.port,
        RotorService::new(state),
    )
    .await
}
