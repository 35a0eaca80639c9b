//! # engine::fifo
//!
//! **FIFO Matching Engine** — walks the sorted trade stream once and closes
//! every SELL against the oldest open lots of the same position.
//!
//! ```text
//! BUY  ──▶ push_back(lot)                          (no gain/loss)
//! SELL ──▶ while remaining > ε and queue not empty:
//!              matched = min(remaining, head.remaining)
//!              emit Form8949Entry(head, matched)
//!              head.remaining -= matched   (pop when < ε)
//!          remaining > ε  ──▶ oversold entry @ zero basis + warning
//! ```
//!
//! One engine per report run. Processing order is part of the contract, so
//! the engine is fed strictly sequentially.

use std::collections::{BTreeMap, VecDeque};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::models::{
    report::{format_tax_date, round_cents},
    AcquiredDate, DispositionKind, Form8949Entry, InventoryLot, OpenPosition, PositionKey, Side,
    Trade,
};

/// Quantities below this are treated as zero (division leaves dust behind).
pub const LOT_EPSILON: Decimal = dec!(0.0001);

/// Holding period at or above which a disposition is long-term.
pub const LONG_TERM_DAYS: i64 = 365;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Character budget for the market title inside an entry description.
pub const TITLE_MAX_LEN: usize = 50;

// ─── Result ───────────────────────────────────────────────────────────────────

/// Everything the matching pass produces.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub entries: Vec<Form8949Entry>,
    /// In position-key order.
    pub open_positions: Vec<OpenPosition>,
    pub warnings: Vec<String>,
}

// ─── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FifoEngine {
    queues: BTreeMap<PositionKey, VecDeque<InventoryLot>>,
    entries: Vec<Form8949Entry>,
    warnings: Vec<String>,
}

impl FifoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one normalised trade. Callers must feed trades in
    /// non-decreasing timestamp order.
    pub fn process(&mut self, trade: &Trade) {
        match trade.side {
            Side::Buy => self.process_buy(trade),
            Side::Sell => self.process_sell(trade),
        }
    }

    fn process_buy(&mut self, trade: &Trade) {
        if trade.quantity < LOT_EPSILON {
            debug!(position = %trade.position_key(), quantity = %trade.quantity, "ignoring dust BUY");
            return;
        }

        self.queues
            .entry(trade.position_key())
            .or_default()
            .push_back(InventoryLot::from_buy(trade));
    }

    fn process_sell(&mut self, trade: &Trade) {
        let key = trade.position_key();
        let unit_proceeds = trade.unit_value();
        let mut remaining = trade.quantity;

        if let Some(queue) = self.queues.get_mut(&key) {
            while remaining > LOT_EPSILON {
                let Some(lot) = queue.front_mut() else { break };

                let matched = remaining.min(lot.remaining_quantity);
                self.entries.push(close_lot(
                    &key,
                    lot,
                    matched,
                    matched * unit_proceeds,
                    trade.timestamp,
                    DispositionKind::Sale,
                ));

                lot.remaining_quantity -= matched;
                remaining -= matched;
                if lot.remaining_quantity < LOT_EPSILON {
                    queue.pop_front();
                }
            }
        }

        if remaining > LOT_EPSILON {
            self.record_oversell(&key, trade, remaining, unit_proceeds);
        }
    }

    /// Covers a SELL the tracked inventory could not: zero basis, all gain.
    fn record_oversell(
        &mut self,
        key: &PositionKey,
        trade: &Trade,
        remaining: Decimal,
        unit_proceeds: Decimal,
    ) {
        let proceeds = round_cents(remaining * unit_proceeds);
        let message = format!(
            "Oversold {} shares of \"{}\" in {} ({}): no matching buy lots",
            remaining.normalize(),
            key.outcome,
            trade.title,
            key.market_id,
        );
        warn!(position = %key, quantity = %remaining, reference = %trade.reference, "⚠️ oversell detected");

        self.entries.push(Form8949Entry {
            description:   describe(&key.outcome, &trade.title, Some("oversold")),
            date_acquired: AcquiredDate::Various,
            date_sold:     format_tax_date(trade.timestamp),
            proceeds,
            cost_basis:    Decimal::ZERO,
            gain_loss:     proceeds,
            is_long_term:  false,
            holding_days:  0,
            market_id:     key.market_id.clone(),
            outcome:       key.outcome.clone(),
            quantity:      remaining,
            kind:          DispositionKind::Oversold,
        });
        self.warnings.push(message);
    }

    /// Consumes the engine, snapshotting every non-empty queue as an
    /// [`OpenPosition`].
    pub fn finish(self) -> MatchOutcome {
        let open_positions: Vec<OpenPosition> = self
            .queues
            .into_iter()
            .filter_map(|(key, lots)| OpenPosition::from_lots(&key, lots.into()))
            .collect();

        debug!(
            entries  = self.entries.len(),
            open     = open_positions.len(),
            warnings = self.warnings.len(),
            "FIFO matching finished"
        );

        MatchOutcome {
            entries: self.entries,
            open_positions,
            warnings: self.warnings,
        }
    }
}

/// Runs a fresh engine over an already sorted trade stream.
pub fn match_trades(trades: &[Trade]) -> MatchOutcome {
    let mut engine = FifoEngine::new();
    for trade in trades {
        engine.process(trade);
    }
    engine.finish()
}

// ─── Entry Construction ───────────────────────────────────────────────────────

/// Builds the entry for disposing `quantity` of `lot` at `disposed_at`.
///
/// Proceeds and basis are rounded here, per entry, never carried unrounded
/// across lots.
pub(crate) fn close_lot(
    key: &PositionKey,
    lot: &InventoryLot,
    quantity: Decimal,
    proceeds: Decimal,
    disposed_at: i64,
    kind: DispositionKind,
) -> Form8949Entry {
    let proceeds = round_cents(proceeds);
    let cost_basis = round_cents(quantity * lot.unit_cost);
    let days = holding_days(lot.acquired_at, disposed_at);
    let suffix = (kind == DispositionKind::Worthless).then_some("worthless");

    Form8949Entry {
        description:   describe(&lot.outcome, &lot.title, suffix),
        date_acquired: AcquiredDate::from_timestamp(lot.acquired_at),
        date_sold:     format_tax_date(disposed_at),
        proceeds,
        cost_basis,
        gain_loss:     proceeds - cost_basis,
        is_long_term:  days >= LONG_TERM_DAYS,
        holding_days:  days,
        market_id:     key.market_id.clone(),
        outcome:       key.outcome.clone(),
        quantity,
        kind,
    }
}

/// Whole days between acquisition and disposal, floored.
#[inline]
pub fn holding_days(acquired_at: i64, disposed_at: i64) -> i64 {
    (disposed_at - acquired_at).div_euclid(SECONDS_PER_DAY)
}

/// `"{outcome} - {title}"`, with the title cut to [`TITLE_MAX_LEN`].
pub fn describe(outcome: &str, title: &str, suffix: Option<&str>) -> String {
    let mut description = format!("{outcome} - {}", truncate_title(title, TITLE_MAX_LEN));
    if let Some(suffix) = suffix {
        description.push_str(&format!(" ({suffix})"));
    }
    description
}

/// Shortens `title` to at most `max_len` characters, ellipsis included.
///
/// Breaks at the last space when that space sits past the middle of the
/// budget, otherwise cuts hard at `max_len - 3`.
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        return title.to_string();
    }

    let budget = max_len.saturating_sub(3);
    let cut: String = title.chars().take(budget).collect();
    let head = match cut.rfind(' ') {
        Some(space) if cut[..space].chars().count() > max_len / 2 => &cut[..space],
        _ => cut.as_str(),
    };
    format!("{head}...")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;
    const T0: i64 = 1_672_617_600; // 2023-01-02

    fn trade(side: Side, outcome: &str, qty: Decimal, notional: Decimal, ts: i64) -> Trade {
        Trade {
            market_id: "m1".into(),
            outcome:   outcome.into(),
            side,
            quantity:  qty,
            notional,
            price:     notional / qty,
            timestamp: ts,
            title:     "Will it rain tomorrow?".into(),
            reference: format!("tx-{ts}"),
        }
    }

    fn buy(qty: Decimal, notional: Decimal, ts: i64) -> Trade {
        trade(Side::Buy, "Yes", qty, notional, ts)
    }

    fn sell(qty: Decimal, notional: Decimal, ts: i64) -> Trade {
        trade(Side::Sell, "Yes", qty, notional, ts)
    }

    #[test]
    fn test_sell_spans_lots_in_fifo_order() {
        let outcome = match_trades(&[
            buy(dec!(10), dec!(10), T0),
            buy(dec!(10), dec!(20), T0 + DAY),
            sell(dec!(12), dec!(36), T0 + 2 * DAY),
        ]);

        assert_eq!(outcome.entries.len(), 2);
        let first = &outcome.entries[0];
        assert_eq!(first.quantity, dec!(10));
        assert_eq!(first.proceeds, dec!(30));
        assert_eq!(first.cost_basis, dec!(10));
        assert_eq!(first.gain_loss, dec!(20));
        assert_eq!(first.holding_days, 2);

        let second = &outcome.entries[1];
        assert_eq!(second.quantity, dec!(2));
        assert_eq!(second.proceeds, dec!(6));
        assert_eq!(second.cost_basis, dec!(4));
        assert_eq!(second.gain_loss, dec!(2));
        assert_eq!(second.holding_days, 1);

        assert_eq!(outcome.open_positions.len(), 1);
        let open = &outcome.open_positions[0];
        assert_eq!(open.total_quantity, dec!(8));
        assert_eq!(open.total_cost_basis, dec!(16));
        assert_eq!(open.lots.len(), 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_long_term_boundary_is_365_days() {
        let held_365 = match_trades(&[
            buy(dec!(1), dec!(0.5), T0),
            sell(dec!(1), dec!(0.9), T0 + 365 * DAY),
        ]);
        assert_eq!(held_365.entries[0].holding_days, 365);
        assert!(held_365.entries[0].is_long_term);

        let held_364 = match_trades(&[
            buy(dec!(1), dec!(0.5), T0),
            sell(dec!(1), dec!(0.9), T0 + 365 * DAY - 1),
        ]);
        assert_eq!(held_364.entries[0].holding_days, 364);
        assert!(!held_364.entries[0].is_long_term);
    }

    #[test]
    fn test_oversell_from_empty_queue() {
        let outcome = match_trades(&[sell(dec!(5), dec!(3), T0)]);

        assert_eq!(outcome.entries.len(), 1);
        let entry = &outcome.entries[0];
        assert_eq!(entry.kind, DispositionKind::Oversold);
        assert_eq!(entry.date_acquired, AcquiredDate::Various);
        assert_eq!(entry.cost_basis, Decimal::ZERO);
        assert_eq!(entry.proceeds, dec!(3));
        assert_eq!(entry.gain_loss, entry.proceeds);
        assert!(!entry.is_long_term);
        assert_eq!(entry.holding_days, 0);

        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("m1"));
        assert!(outcome.warnings[0].contains("\"Yes\""));
        assert!(outcome.open_positions.is_empty());
    }

    #[test]
    fn test_oversell_after_partial_match() {
        let outcome = match_trades(&[
            buy(dec!(3), dec!(1.5), T0),
            sell(dec!(5), dec!(4), T0 + DAY),
        ]);

        assert_eq!(outcome.entries.len(), 2);
        assert_eq!(outcome.entries[0].kind, DispositionKind::Sale);
        assert_eq!(outcome.entries[0].quantity, dec!(3));
        assert_eq!(outcome.entries[0].proceeds, dec!(2.4));
        assert_eq!(outcome.entries[1].kind, DispositionKind::Oversold);
        assert_eq!(outcome.entries[1].quantity, dec!(2));
        assert_eq!(outcome.entries[1].proceeds, dec!(1.6));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("Oversold 2 shares"));
    }

    #[test]
    fn test_each_oversell_gets_its_own_warning() {
        let outcome = match_trades(&[
            sell(dec!(1), dec!(0.5), T0),
            trade(Side::Sell, "No", dec!(1), dec!(0.5), T0 + 1),
        ]);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn test_dust_below_epsilon_closes_lot() {
        let outcome = match_trades(&[
            buy(dec!(10), dec!(5), T0),
            sell(dec!(9.99995), dec!(6), T0 + DAY),
        ]);
        assert!(outcome.open_positions.is_empty());
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.entries.len(), 1);
    }

    #[test]
    fn test_dust_buy_never_opens_a_lot() {
        let outcome = match_trades(&[
            buy(dec!(0.00005), dec!(0.01), T0),
            trade(Side::Buy, "No", dec!(1), dec!(0.4), T0 + 1),
        ]);
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.open_positions.len(), 1);
        assert_eq!(outcome.open_positions[0].outcome, "No");
    }

    #[test]
    fn test_positions_are_isolated_by_outcome() {
        let outcome = match_trades(&[
            buy(dec!(5), dec!(2), T0),
            trade(Side::Sell, "No", dec!(5), dec!(3), T0 + DAY),
        ]);
        assert_eq!(outcome.entries.len(), 1);
        assert_eq!(outcome.entries[0].kind, DispositionKind::Oversold);
        assert_eq!(outcome.open_positions.len(), 1);
        assert_eq!(outcome.open_positions[0].outcome, "Yes");
    }

    #[test]
    fn test_quantity_is_conserved() {
        let trades = [
            buy(dec!(3.3), dec!(1), T0),
            buy(dec!(7.1), dec!(2), T0 + 10),
            sell(dec!(2), dec!(1), T0 + 20),
            buy(dec!(1.25), dec!(0.5), T0 + 30),
            sell(dec!(6.4), dec!(4), T0 + 40),
        ];
        let outcome = match_trades(&trades);

        let bought: Decimal = trades.iter().filter(|t| t.side == Side::Buy).map(|t| t.quantity).sum();
        let matched: Decimal = outcome.entries.iter().map(|e| e.quantity).sum();
        let open: Decimal = outcome.open_positions.iter().map(|p| p.total_quantity).sum();
        assert!((bought - matched - open).abs() < LOT_EPSILON);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_entry_rounding_is_per_entry() {
        // unit cost 1/3 → 1 token costs 0.333.. → 0.33 per entry
        let outcome = match_trades(&[
            buy(dec!(3), dec!(1), T0),
            sell(dec!(1), dec!(0.5), T0 + 1),
            sell(dec!(1), dec!(0.5), T0 + 2),
            sell(dec!(1), dec!(0.5), T0 + 3),
        ]);
        for entry in &outcome.entries {
            assert_eq!(entry.cost_basis, dec!(0.33));
            assert_eq!(entry.gain_loss, round_cents(entry.proceeds - entry.cost_basis));
        }
    }

    #[test]
    fn test_truncate_title_prefers_word_boundary() {
        let title = "Will the Federal Reserve cut interest rates in March 2025?";
        let short = truncate_title(title, 30);
        assert_eq!(short, "Will the Federal Reserve...");
        assert!(short.chars().count() <= 30);
    }

    #[test]
    fn test_truncate_title_hard_cut_without_late_space() {
        let title = "Supercalifragilisticexpialidocious outcome";
        assert_eq!(truncate_title(title, 20), "Supercalifragilis...");
    }

    #[test]
    fn test_truncate_title_short_titles_untouched() {
        assert_eq!(truncate_title("Short", 50), "Short");
    }

    #[test]
    fn test_describe_format() {
        assert_eq!(describe("Yes", "Rain?", None), "Yes - Rain?");
        assert_eq!(describe("No", "Rain?", Some("worthless")), "No - Rain? (worthless)");
    }
}
