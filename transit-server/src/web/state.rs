//! Shared handler state.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::network::NetworkIndex;
use crate::planner::SearchConfig;
use crate::store::TransitStore;

/// State cloned into every handler.
///
/// Queries take the network lock shared; mutations take it exclusively
/// for the duration of validate-persist-apply, so readers never observe
/// a half-applied change.
#[derive(Clone)]
pub struct AppState {
    pub network: Arc<RwLock<NetworkIndex>>,
    pub store: Arc<dyn TransitStore>,
    pub config: Arc<SearchConfig>,
}

impl AppState {
    pub fn new(network: NetworkIndex, store: Arc<dyn TransitStore>, config: SearchConfig) -> Self {
        Self {
            network: Arc::new(RwLock::new(network)),
            store,
            config: Arc::new(config),
        }
    }
}
