use std::sync::Arc;

use crate::builder::SnapshotBuilder;
use crate::cache::SnapshotCache;
use crate::config::AggregatorConfig;

#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<SnapshotBuilder>,
    pub cache: Arc<SnapshotCache>,
}

impl AppState {
    pub fn new(config: AggregatorConfig) -> Self {
        let cache = Arc::new(SnapshotCache::new(config.snapshot_ttl));
        let builder = Arc::new(SnapshotBuilder::new(config));

        Self { builder, cache }
    }
}
