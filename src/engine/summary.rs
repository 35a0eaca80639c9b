//! # engine::summary
//!
//! Pure aggregation of disposal entries into a [`TaxReport`].
//!
//! Every total is rounded on its own with [`round_cents`]. The grand total is
//! rounded from the raw per-entry sum, not from the two partition totals, so
//! it can sit one cent away from `short + long`. That matches the published
//! report format and is expected.

use rust_decimal::Decimal;

use crate::models::{report::round_cents, Form8949Entry, OpenPosition, Summary, TaxReport};

/// Totals over one partition.
pub fn summarize_entries(entries: &[Form8949Entry]) -> Summary {
    let total = |f: fn(&Form8949Entry) -> Decimal| round_cents(entries.iter().map(f).sum());

    Summary {
        count:            entries.len(),
        total_proceeds:   total(|e| e.proceeds),
        total_cost_basis: total(|e| e.cost_basis),
        total_gain_loss:  total(|e| e.gain_loss),
    }
}

/// Partitions entries by holding period and rolls everything up.
pub fn summarize(
    tax_year: i32,
    entries: Vec<Form8949Entry>,
    open_positions: Vec<OpenPosition>,
    warnings: Vec<String>,
) -> TaxReport {
    let total_gain_loss = round_cents(entries.iter().map(|e| e.gain_loss).sum());
    let (long_term, short_term): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.is_long_term);

    TaxReport {
        tax_year,
        short_term_summary: summarize_entries(&short_term),
        long_term_summary: summarize_entries(&long_term),
        total_transactions: short_term.len() + long_term.len(),
        short_term,
        long_term,
        total_gain_loss,
        warnings,
        open_positions,
    }
}
