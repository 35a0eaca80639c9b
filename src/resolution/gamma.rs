//! # resolution::gamma
//!
//! [`MarketResolver`] backed by the Gamma markets API over HTTP.
//!
//! ## API Contract
//! `GET {base}/markets?condition_ids={id}` returns an array of markets:
//! ```json
//! [{ "conditionId": "0x..", "closed": true,
//!    "outcomes": "[\"Yes\", \"No\"]", "outcomePrices": "[\"0\", \"1\"]" }]
//! ```
//! `outcomes` / `outcomePrices` are JSON arrays encoded as strings. A closed
//! market's winner is the outcome that settled at a price of 1.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use tracing::{debug, error};

use super::{MarketResolution, MarketResolver, ResolverError};

/// Settled prices come back as "1" but occasionally as "0.9999..".
const WINNING_PRICE: Decimal = dec!(0.99);

// ─── Wire Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    #[serde(default)]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub outcomes: Option<String>,
    #[serde(default)]
    pub outcome_prices: Option<String>,
}

impl GammaMarket {
    /// Maps the wire shape onto resolution facts.
    pub fn to_resolution(&self) -> Result<MarketResolution, ResolverError> {
        if !self.closed {
            return Ok(MarketResolution { closed: false, winning_outcome: None });
        }

        let outcomes: Vec<String> = decode_list(self.outcomes.as_deref(), "outcomes")?;
        let prices: Vec<String> = decode_list(self.outcome_prices.as_deref(), "outcomePrices")?;
        if outcomes.len() != prices.len() {
            return Err(ResolverError::Malformed(format!(
                "{} outcomes but {} prices",
                outcomes.len(),
                prices.len()
            )));
        }

        let mut winning_outcome = None;
        for (outcome, price) in outcomes.into_iter().zip(prices) {
            let price: Decimal = price
                .trim()
                .parse()
                .map_err(|e| ResolverError::Malformed(format!("price '{price}': {e}")))?;
            if price >= WINNING_PRICE {
                winning_outcome = Some(outcome);
                break;
            }
        }

        Ok(MarketResolution { closed: true, winning_outcome })
    }
}

fn decode_list(raw: Option<&str>, field: &str) -> Result<Vec<String>, ResolverError> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| ResolverError::Malformed(format!("{field}: {e}"))),
    }
}

// ─── Client ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GammaResolver {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    concurrency: usize,
}

impl GammaResolver {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(10),
            concurrency: super::DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }
}

#[async_trait]
impl MarketResolver for GammaResolver {
    async fn resolve_market(&self, market_id: &str) -> Result<Option<MarketResolution>, ResolverError> {
        let url = format!("{}/markets", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("condition_ids", market_id)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                error!(market_id, error = %e, "Gamma API unreachable");
                ResolverError::Unreachable(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::Http { status, body });
        }

        let markets: Vec<GammaMarket> = response
            .json()
            .await
            .map_err(|e| ResolverError::Malformed(e.to_string()))?;

        let Some(market) = markets.iter().find(|m| {
            m.condition_id
                .as_deref()
                .map_or(true, |id| id.eq_ignore_ascii_case(market_id))
        }) else {
            return Ok(None);
        };

        let resolution = market.to_resolution()?;
        debug!(
            market_id,
            closed  = resolution.closed,
            winner  = ?resolution.winning_outcome,
            "market resolved"
        );
        Ok(Some(resolution))
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }
}
