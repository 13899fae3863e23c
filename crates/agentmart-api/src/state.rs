//! Application state shared across handlers

use std::sync::Arc;

use agentmart_chain::ChainSubmitter;
use agentmart_db::CatalogStore;
use agentmart_purchase::PurchaseRecorder;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Catalog store (PostgreSQL or in-memory)
    pub store: Arc<dyn CatalogStore>,
    /// Records purchases reported by clients
    pub recorder: PurchaseRecorder,
    /// Relays signed transactions to the node
    pub submitter: Arc<dyn ChainSubmitter>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, submitter: Arc<dyn ChainSubmitter>) -> Self {
        Self {
            recorder: PurchaseRecorder::new(store.clone()),
            store,
            submitter,
        }
    }
}
