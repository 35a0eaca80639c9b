//! # engine::worthless
//!
//! **Worthless-Position Resolver** — force-closes open positions on the
//! losing side of a settled market.
//!
//! ```text
//! OpenPosition ──▶ market closed + winner known?
//!                      ├─ no  ──▶ stays open
//!                      ├─ outcome == winner (case-insensitive) ──▶ stays open
//!                      └─ otherwise ──▶ one entry per lot:
//!                               proceeds 0, basis = lot's remaining cost,
//!                               sold = Dec 31 23:59:59 of the tax year
//! ```
//!
//! Lots acquired after that year-end cannot be disposed of in it; they stay
//! open for a later year's report.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::engine::fifo::close_lot;
use crate::models::{report::tax_year_end, DispositionKind, Form8949Entry, OpenPosition};
use crate::resolution::Resolutions;

/// Result of applying resolutions to the open book.
#[derive(Debug, Clone, Default)]
pub struct WriteOff {
    pub entries: Vec<Form8949Entry>,
    /// Positions that are still open: winners, unresolved or unknown markets.
    pub still_open: Vec<OpenPosition>,
}

/// Distinct market ids across `positions`, sorted.
pub fn markets_to_resolve(positions: &[OpenPosition]) -> Vec<String> {
    positions
        .iter()
        .map(|p| p.market_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Returns `true` if `position` lost according to `resolutions`.
pub fn is_worthless(position: &OpenPosition, resolutions: &Resolutions) -> bool {
    resolutions
        .get(&position.market_id)
        .and_then(|r| r.settled_winner())
        .map(|winner| winner.to_lowercase() != position.outcome.trim().to_lowercase())
        .unwrap_or(false)
}

/// Writes off every losing position at the end of `tax_year`.
pub fn write_off_worthless(
    positions: Vec<OpenPosition>,
    resolutions: &Resolutions,
    tax_year: i32,
) -> WriteOff {
    let disposed_at = tax_year_end(tax_year);
    let mut result = WriteOff::default();

    for position in positions {
        if !is_worthless(&position, resolutions) {
            debug!(market_id = %position.market_id, outcome = %position.outcome, "position stays open");
            result.still_open.push(position);
            continue;
        }

        let key = position.position_key();
        let (held, later): (Vec<_>, Vec<_>) =
            position.lots.into_iter().partition(|lot| lot.acquired_at <= disposed_at);

        info!(
            market_id = %key.market_id,
            outcome   = %key.outcome,
            lots      = held.len(),
            deferred  = later.len(),
            "🪦 writing off worthless position"
        );

        for lot in &held {
            result.entries.push(close_lot(
                &key,
                lot,
                lot.remaining_quantity,
                Decimal::ZERO,
                disposed_at,
                DispositionKind::Worthless,
            ));
        }

        if let Some(rest) = OpenPosition::from_lots(&key, later) {
            result.still_open.push(rest);
        }
    }

    result
}
