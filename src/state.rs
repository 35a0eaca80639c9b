//! # state
//!
//! Shared application state. Report runs own their inventory, so the only
//! things shared across requests are configuration, the pooled HTTP client
//! inside the resolver, and a request counter.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use anyhow::Context;

use crate::config::Config;
use crate::resolution::GammaResolver;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
pub struct AppState {
    pub config: Arc<Config>,

    /// Default resolver for requests that carry no inline resolutions.
    /// Wraps one `reqwest::Client` (connection pooling, thread-safe).
    pub resolver: Arc<GammaResolver>,

    pub report_count: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let resolver = GammaResolver::new(http_client, config.gamma_api_url.clone())
            .with_timeout(config.resolver_timeout)
            .with_concurrency(config.resolver_concurrency);

        Ok(Self {
            config:       Arc::new(config),
            resolver:     Arc::new(resolver),
            report_count: AtomicU64::new(0),
        })
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(config: Config) -> anyhow::Result<SharedState> {
    Ok(Arc::new(AppState::new(config)?))
}
