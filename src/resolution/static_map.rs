//! # resolution::static_map
//!
//! Answers from a map the caller already holds: resolutions passed inline
//! with a report request, or fixtures in tests.

use async_trait::async_trait;

use super::{MarketResolution, MarketResolver, ResolverError, Resolutions};

#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    resolutions: Resolutions,
}

impl StaticResolver {
    pub fn new(resolutions: Resolutions) -> Self {
        Self { resolutions }
    }
}

impl FromIterator<(String, MarketResolution)> for StaticResolver {
    fn from_iter<I: IntoIterator<Item = (String, MarketResolution)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl MarketResolver for StaticResolver {
    async fn resolve_market(&self, market_id: &str) -> Result<Option<MarketResolution>, ResolverError> {
        Ok(self.resolutions.get(market_id).cloned())
    }
}
