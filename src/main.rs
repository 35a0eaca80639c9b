//! # Polytax — Form 8949 reports for prediction-market wallets
//!
//! ```text
//!  ┌─────────────┐  POST /api/report   ┌──────────────────────────────┐
//!  │  Client     │ ──────────────────▶ │ normalize → FIFO → write-off │
//!  └─────────────┘  ◀── TaxReport ──── │        → summarize           │
//!                                      └──────────────┬───────────────┘
//!                                                     │ open positions only
//!                                                     ▼
//!                                      ┌──────────────────────────────┐
//!                                      │ Gamma API (market outcomes)  │
//!                                      └──────────────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable                | Default                            | Description                    |
//! |-------------------------|------------------------------------|--------------------------------|
//! | `BIND_ADDR`             | `0.0.0.0:3000`                     | Address Axum listens on        |
//! | `GAMMA_API_URL`         | `https://gamma-api.polymarket.com` | Market resolution API          |
//! | `RESOLVER_CONCURRENCY`  | `8`                                | Lookups in flight              |
//! | `RESOLVER_TIMEOUT_SECS` | `10`                               | Per-lookup timeout             |
//! | `API_KEY`               | unset (dev mode)                   | Required `X-API-Key` value     |
//! | `RUST_LOG`              | `polytax=debug`                    | Tracing filter                 |

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use polytax::{config::Config, routes::router, state::build_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("polytax=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║           POLYTAX · FIFO Capital Gains                ║
  ║  Normalize · Match · Write-off · Summarize            ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Config & shared state ──────────────────────────────────────────────
    let config = Config::from_env()?;
    let addr = config.bind_addr;
    info!(
        gamma_api_url = %config.gamma_api_url,
        concurrency   = config.resolver_concurrency,
        auth          = config.api_key.is_some(),
        "⚙️ configuration loaded"
    );
    let state = build_state(config)?;

    // ── 4. Router ─────────────────────────────────────────────────────────────
    let app = router(state);

    // ── 5. Bind & Serve ───────────────────────────────────────────────────────
    info!(?addr, "🚀 Polytax server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
