//! # auth — API Key Middleware
//!
//! Guards the API with an `X-API-Key` header.
//!
//! ## Mode
//! - `API_KEY` unset or blank → **allow all** (dev mode)
//! - `API_KEY` set → every request must send `X-API-Key: <key>`
//!
//! ## Exempt
//! `/api/health` never needs a key.
//!
//! ## Usage
//! ```bash
//! API_KEY=super-secret-key-here cargo run
//! curl -H "X-API-Key: super-secret-key-here" -d @trades.json \
//!      -H 'Content-Type: application/json' http://localhost:3000/api/report
//! ```

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::state::SharedState;

pub const API_KEY_HEADER: &str = "X-API-Key";

const EXEMPT_PATHS: &[&str] = &["/api/health"];

pub async fn require_api_key(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // ── Dev Mode ──────────────────────────────────────────────────────────────
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(request).await;
    };

    let path = request.uri().path();
    if EXEMPT_PATHS.contains(&path) {
        return next.run(request).await;
    }

    // ── Header Check ──────────────────────────────────────────────────────────
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if provided == expected {
        next.run(request).await
    } else {
        warn!(path, "❌ Unauthorized request: invalid or missing X-API-Key");
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "ok":    false,
                "error": "Unauthorized: invalid or missing X-API-Key header",
            })),
        )
            .into_response()
    }
}
