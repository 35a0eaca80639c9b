//! # config — runtime settings from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

use crate::resolution::DEFAULT_CONCURRENCY;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address for the HTTP API
    pub bind_addr:            SocketAddr,
    /// Base URL of the market resolution API
    pub gamma_api_url:        String,
    /// Market lookups in flight at once
    pub resolver_concurrency: usize,
    /// Per-lookup timeout
    pub resolver_timeout:     Duration,
    /// `None` = every request allowed (dev mode)
    pub api_key:              Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr:            ([0, 0, 0, 0], 3000).into(),
            gamma_api_url:        DEFAULT_GAMMA_API_URL.to_string(),
            resolver_concurrency: DEFAULT_CONCURRENCY,
            resolver_timeout:     Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key:              None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr: SocketAddr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:3000")?;

        let resolver_concurrency: usize = match var("RESOLVER_CONCURRENCY") {
            Some(v) => v.parse().context("RESOLVER_CONCURRENCY must be a number")?,
            None => DEFAULT_CONCURRENCY,
        };
        anyhow::ensure!(resolver_concurrency > 0, "RESOLVER_CONCURRENCY must be at least 1");

        let timeout_secs: u64 = match var("RESOLVER_TIMEOUT_SECS") {
            Some(v) => v.parse().context("RESOLVER_TIMEOUT_SECS must be a number")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            gamma_api_url:    var("GAMMA_API_URL").unwrap_or_else(|| DEFAULT_GAMMA_API_URL.to_string()),
            resolver_concurrency,
            resolver_timeout: Duration::from_secs(timeout_secs),
            api_key:          var("API_KEY"),
        })
    }
}
