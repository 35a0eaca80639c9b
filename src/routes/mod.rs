//! # routes
//!
//! | Method | Path          | Auth | Description                   |
//! |--------|---------------|------|-------------------------------|
//! | GET    | `/api/health` | no   | Liveness + version            |
//! | POST   | `/api/report` | yes  | FIFO tax report for one year  |

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::require_api_key;
use crate::state::SharedState;

pub mod health;
pub mod report;

use health::health_check;
use report::create_report;

/// Full application router with middleware applied.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/report", post(create_report))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
