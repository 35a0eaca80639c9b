//! # routes::report
//!
//! **Form 8949 report** for one wallet history and one tax year.
//!
//! ## Endpoint
//! POST /api/report
//!
//! ```json
//! { "taxYear": 2024,
//!   "trades": [ { "timestamp": 1709640000, "type": "TRADE", "side": "BUY",
//!                 "conditionId": "0xabc", "outcome": "Yes",
//!                 "size": "10", "usdcSize": "4.2", "title": "..." } ],
//!   "resolutions": { "0xabc": { "closed": true, "winningOutcome": "No" } } }
//! ```
//!
//! With `resolutions` present the report uses exactly those facts; without
//! them, open positions are checked against the Gamma API.

use std::sync::atomic::Ordering;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    engine::generate_report,
    error::AppError,
    models::RawTrade,
    resolution::{Resolutions, StaticResolver},
    state::SharedState,
};

const MIN_TAX_YEAR: i32 = 1970;
const MAX_TAX_YEAR: i32 = 9999;

// ─── Request ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub tax_year:    i32,
    #[serde(default)]
    pub trades:      Vec<RawTrade>,
    /// Inline resolution facts keyed by market id
    #[serde(default)]
    pub resolutions: Option<Resolutions>,
}

impl ReportRequest {
    fn validate(&self) -> Result<(), AppError> {
        if !(MIN_TAX_YEAR..=MAX_TAX_YEAR).contains(&self.tax_year) {
            return Err(AppError::BadRequest(format!(
                "taxYear must be between {MIN_TAX_YEAR} and {MAX_TAX_YEAR}, got {}",
                self.tax_year
            )));
        }
        Ok(())
    }
}

// ─── Handler ──────────────────────────────────────────────────────────────────

pub async fn create_report(
    State(state): State<SharedState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    info!(
        tax_year = request.tax_year,
        trades   = request.trades.len(),
        inline   = request.resolutions.is_some(),
        "📥 report requested"
    );

    let report = match request.resolutions {
        Some(resolutions) => {
            let resolver = StaticResolver::new(resolutions);
            generate_report(&request.trades, request.tax_year, &resolver).await
        }
        None => generate_report(&request.trades, request.tax_year, state.resolver.as_ref()).await,
    };

    state.report_count.fetch_add(1, Ordering::Relaxed);

    Ok(Json(json!({
        "ok":     true,
        "report": report,
    })))
}
