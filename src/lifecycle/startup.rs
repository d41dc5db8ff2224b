//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the session store configured for this run
//! - Build catalog, health context, transport and selector in order
//!
//! # Design Decisions
//! - Fail fast: a store that cannot be opened is fatal
//! - Metrics exporter is installed by the binary, not here

use std::sync::Arc;
use std::time::Duration;

use crate::config::ReactorConfig;
use crate::error::ReactorResult;
use crate::health::EndpointHealthContext;
use crate::network::NetworkCatalog;
use crate::selection::EndpointSelector;
use crate::storage::{FileStore, MemoryStore, SessionStore};
use crate::transport::HttpTransport;

/// Open the configured session store.
pub fn open_store(config: &ReactorConfig) -> ReactorResult<Arc<dyn SessionStore>> {
    match &config.storage.path {
        Some(path) => {
            let store = FileStore::open(path)?;
            tracing::debug!(path = %store.path().display(), "Using file session store");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Build the shared health context over `store`.
pub fn build_context(
    config: &ReactorConfig,
    store: Arc<dyn SessionStore>,
) -> Arc<EndpointHealthContext> {
    let catalog = Arc::new(NetworkCatalog::from_config(config));
    Arc::new(EndpointHealthContext::new(
        catalog,
        store,
        config.health_check.clone(),
    ))
}

/// Wire a selector over HTTP for a validated configuration.
pub fn build_selector(config: &ReactorConfig) -> ReactorResult<EndpointSelector> {
    let store = open_store(config)?;
    let context = build_context(config, store);

    let timeout = Duration::from_secs(config.health_check.timeout_secs);
    let transport = HttpTransport::new(timeout)?;

    tracing::info!(
        networks = context.catalog().len(),
        blocked = context.blocklist().len(),
        strategy = ?config.selection.strategy,
        "Endpoint reactor ready"
    );

    Ok(EndpointSelector::with_strategy(
        context,
        Arc::new(transport),
        config.selection.strategy,
    ))
}
