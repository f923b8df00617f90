//! Cached industry averages: the aggregator guarded by the averages cache

use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{RatioAggregator, validate_label};
use crate::api::PeerSource;
use crate::cache::{AveragesCache, SystemClock};
use crate::config::CompareConfig;
use crate::error::Result;
use crate::model::IndustryAverage;
use crate::store::SnapshotStore;

/// Entry point for industry averages, independent of any front-end
#[derive(Clone, Debug)]
pub struct IndustryAverages {
    aggregator: RatioAggregator,
    cache: AveragesCache,
}

impl IndustryAverages {
    pub fn new(aggregator: RatioAggregator, cache: AveragesCache) -> Self {
        Self { aggregator, cache }
    }

    /// Wire a peer source with the cache settings from `config`
    pub fn from_config(source: Arc<dyn PeerSource>, config: &CompareConfig) -> Self {
        let aggregator = RatioAggregator::with_peer_limit(source, config.peer_limit);
        let clock = Arc::new(SystemClock);

        let cache = match config.resolved_cache_dir() {
            Some(dir) if config.persist_cache => {
                AveragesCache::persistent(config.average_ttl, clock, SnapshotStore::in_dir(dir))
            }
            _ => AveragesCache::with_clock(config.average_ttl, clock),
        };

        Self::new(aggregator, cache)
    }

    pub fn cache(&self) -> &AveragesCache {
        &self.cache
    }

    /// Averages for `industry`, computed at most once per TTL window
    pub async fn get_or_compute(&self, industry: &str) -> Result<IndustryAverage> {
        self.get_or_compute_with_ttl(industry, self.cache.ttl()).await
    }

    pub async fn get_or_compute_with_ttl(
        &self,
        industry: &str,
        ttl: Duration,
    ) -> Result<IndustryAverage> {
        validate_label(industry)?;
        self.cache
            .get_or_compute_with_ttl(industry, ttl, || {
                self.aggregator.compute_industry_average(industry)
            })
            .await
    }
}
