//! # resolution
//!
//! Boundary to whatever knows how markets settled.
//!
//! The core only needs one question answered per market: *is it closed, and
//! which outcome won?* Anything that can answer that implements
//! [`MarketResolver`]. Lookups are independent per market, so the provided
//! [`MarketResolver::resolve_markets`] fans them out with bounded
//! parallelism and merges the answers into a read-only map.
//!
//! A market missing from that map is simply "not resolved".

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod gamma;
pub mod static_map;

pub use gamma::GammaResolver;
pub use static_map::StaticResolver;

/// Default number of lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

// ─── Resolution Facts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketResolution {
    pub closed: bool,
    #[serde(default)]
    pub winning_outcome: Option<String>,
}

impl MarketResolution {
    /// The winner, only once the market is closed and decided.
    pub fn settled_winner(&self) -> Option<&str> {
        if !self.closed {
            return None;
        }
        self.winning_outcome.as_deref().map(str::trim).filter(|w| !w.is_empty())
    }
}

pub type Resolutions = HashMap<String, MarketResolution>;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ResolverError {
    /// The resolution service could not be reached or timed out.
    #[error("Resolution service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-success HTTP status.
    #[error("Resolution service HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The answer could not be understood.
    #[error("Malformed resolution payload: {0}")]
    Malformed(String),
}

// ─── Resolver Trait ───────────────────────────────────────────────────────────

#[async_trait]
pub trait MarketResolver: Send + Sync {
    /// Looks up one market. `Ok(None)` = the service does not know it.
    async fn resolve_market(&self, market_id: &str) -> Result<Option<MarketResolution>, ResolverError>;

    /// Maximum lookups in flight during [`Self::resolve_markets`].
    fn concurrency(&self) -> usize {
        DEFAULT_CONCURRENCY
    }

    /// Resolves every distinct id once. Failures are logged and left out of
    /// the map rather than failing the batch.
    async fn resolve_markets(&self, market_ids: &[String]) -> Resolutions {
        let distinct: BTreeSet<String> = market_ids.iter().cloned().collect();
        debug!(requested = market_ids.len(), distinct = distinct.len(), "resolving markets");

        let answers: Vec<(String, Result<Option<MarketResolution>, ResolverError>)> =
            stream::iter(distinct)
                .map(|id| async move {
                    let answer = self.resolve_market(&id).await;
                    (id, answer)
                })
                .buffer_unordered(self.concurrency().max(1))
                .collect()
                .await;

        let mut resolutions = Resolutions::with_capacity(answers.len());
        for (id, answer) in answers {
            match answer {
                Ok(Some(resolution)) => {
                    resolutions.insert(id, resolution);
                }
                Ok(None) => debug!(market_id = %id, "market unknown to resolver"),
                Err(e) => warn!(market_id = %id, error = %e, "⚠️ market lookup failed, treating as unresolved"),
            }
        }
        resolutions
    }
}
