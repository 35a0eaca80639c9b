//! # engine
//!
//! The report pipeline, end to end:
//!
//! ```text
//! raw trades ──▶ normalizer ──▶ sorted stream ──▶ fifo ──▶ (entries, open)
//!                                                             │
//!                 resolver lookups (batched, deduplicated) ──▶ worthless
//!                                                             │
//!                                                  summary ──▶ TaxReport
//! ```
//!
//! Each run owns its own [`fifo::FifoEngine`]; nothing is shared between
//! runs, so reports for different wallets or years can be computed
//! concurrently.

pub mod fifo;
pub mod normalizer;
pub mod summary;
pub mod worthless;

use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::models::{RawTrade, TaxReport};
use crate::resolution::{MarketResolver, Resolutions};

/// Builds a report from trades and already-known market resolutions.
pub fn build_report(raw: &[RawTrade], tax_year: i32, resolutions: &Resolutions) -> TaxReport {
    let trades = normalizer::normalize_trades(raw);
    let matched = fifo::match_trades(&trades);
    finish_report(matched, tax_year, resolutions)
}

/// Builds a report, asking `resolver` about every market that still has an
/// open position after matching.
pub async fn generate_report<R>(raw: &[RawTrade], tax_year: i32, resolver: &R) -> TaxReport
where
    R: MarketResolver + ?Sized,
{
    let span = info_span!("report", run_id = %Uuid::new_v4(), tax_year);

    async move {
        let trades = normalizer::normalize_trades(raw);
        let matched = fifo::match_trades(&trades);

        let market_ids = worthless::markets_to_resolve(&matched.open_positions);
        let resolutions = if market_ids.is_empty() {
            Resolutions::new()
        } else {
            resolver.resolve_markets(&market_ids).await
        };

        finish_report(matched, tax_year, &resolutions)
    }
    .instrument(span)
    .await
}

fn finish_report(matched: fifo::MatchOutcome, tax_year: i32, resolutions: &Resolutions) -> TaxReport {
    let fifo::MatchOutcome { mut entries, open_positions, warnings } = matched;

    let write_off = worthless::write_off_worthless(open_positions, resolutions, tax_year);
    entries.extend(write_off.entries);

    let report = summary::summarize(tax_year, entries, write_off.still_open, warnings);
    info!(
        transactions = report.total_transactions,
        short_term   = report.short_term.len(),
        long_term    = report.long_term.len(),
        open         = report.open_positions.len(),
        warnings     = report.warnings.len(),
        gain_loss    = %report.total_gain_loss,
        "📊 tax report built"
    );
    report
}
