//! # routes::health
//!
//! `GET /api/health` — liveness probe, never behind the API key.

use std::sync::atomic::Ordering;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::state::SharedState;

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":      true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "reports": state.report_count.load(Ordering::Relaxed),
    }))
}
