//! # engine::normalizer
//!
//! **Trade Normalizer** — turns raw history records into canonical
//! [`Trade`]s and puts them in processing order.
//!
//! ```text
//! RawTrade
//!     │
//!     ├─ no market id / outcome / positive quantity ──▶ dropped
//!     ├─ REDEEM        ──▶ SELL @ 1.0, notional = quantity
//!     ├─ TRADE + side  ──▶ price = notional / quantity when missing
//!     ├─ notional / quantity overflows ──▶ dropped
//!     └─ anything else ──▶ dropped
//! ```
//!
//! Drops are not errors: noisy upstream history is expected.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{RawTrade, Side, Trade, TradeKind};

/// Normalises a single record. `None` means "drop it".
pub fn normalize_trade(raw: &RawTrade) -> Option<Trade> {
    let market_id = non_blank(raw.market_id.as_deref());
    let outcome = non_blank(raw.outcome.as_deref());
    let (Some(market_id), Some(outcome)) = (market_id, outcome) else {
        debug!(timestamp = raw.timestamp, "dropping record without market id or outcome");
        return None;
    };

    // Zero quantity would make every unit price non-finite.
    let quantity = match raw.quantity {
        Some(q) if q > Decimal::ZERO => q,
        _ => {
            debug!(market_id, timestamp = raw.timestamp, "dropping record without positive quantity");
            return None;
        }
    };

    let (side, notional, price) = match raw.kind {
        TradeKind::Redeem => (Side::Sell, quantity, Decimal::ONE),
        TradeKind::Trade => {
            let Some(side) = raw.side else {
                debug!(market_id, timestamp = raw.timestamp, "dropping TRADE without side");
                return None;
            };
            let explicit_price = raw.price.filter(|p| !p.is_zero());
            let notional = match (raw.notional, explicit_price) {
                (Some(n), _) => Some(n),
                (None, Some(p)) => p.checked_mul(quantity),
                (None, None) => {
                    debug!(market_id, timestamp = raw.timestamp, "dropping TRADE without notional or price");
                    return None;
                }
            };
            // Tiny quantities can push the unit value past Decimal's range.
            let Some((notional, unit_value)) =
                notional.and_then(|n| n.checked_div(quantity).map(|unit| (n, unit)))
            else {
                debug!(market_id, timestamp = raw.timestamp, "dropping TRADE with out-of-range value");
                return None;
            };
            (side, notional, explicit_price.unwrap_or(unit_value))
        }
        TradeKind::Other => {
            debug!(market_id, timestamp = raw.timestamp, "dropping unsupported activity type");
            return None;
        }
    };

    Some(Trade {
        market_id: market_id.to_string(),
        outcome: outcome.to_string(),
        side,
        quantity,
        notional,
        price,
        timestamp: raw.timestamp,
        title: raw.title.clone().unwrap_or_default(),
        reference: raw.reference.clone().unwrap_or_default(),
    })
}

/// Normalises every record and sorts the survivors by timestamp.
///
/// The sort is stable: trades sharing a timestamp keep their input order,
/// which is the order FIFO will match them in.
pub fn normalize_trades(raw: &[RawTrade]) -> Vec<Trade> {
    let mut trades: Vec<Trade> = raw.iter().filter_map(normalize_trade).collect();
    trades.sort_by_key(|t| t.timestamp);

    debug!(
        received   = raw.len(),
        normalized = trades.len(),
        dropped    = raw.len() - trades.len(),
        "trades normalized"
    );
    trades
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(kind: TradeKind, side: Option<Side>, qty: Decimal, notional: Decimal, ts: i64) -> RawTrade {
        RawTrade {
            timestamp: ts,
            kind,
            side,
            market_id: Some("m1".into()),
            outcome: Some("Yes".into()),
            quantity: Some(qty),
            notional: Some(notional),
            price: None,
            reference: Some(format!("tx-{ts}")),
            title: Some("Will it rain?".into()),
        }
    }

    #[test]
    fn test_redeem_becomes_sell_at_one() {
        let t = normalize_trade(&raw(TradeKind::Redeem, None, dec!(7), dec!(0), 10)).unwrap();
        assert_eq!(t.side, Side::Sell);
        assert_eq!(t.quantity, dec!(7));
        assert_eq!(t.notional, dec!(7));
        assert_eq!(t.price, dec!(1));
    }

    #[test]
    fn test_missing_price_is_derived() {
        let t = normalize_trade(&raw(TradeKind::Trade, Some(Side::Buy), dec!(8), dec!(2), 10)).unwrap();
        assert_eq!(t.price, dec!(0.25));

        let mut zero_price = raw(TradeKind::Trade, Some(Side::Buy), dec!(8), dec!(2), 10);
        zero_price.price = Some(Decimal::ZERO);
        assert_eq!(normalize_trade(&zero_price).unwrap().price, dec!(0.25));
    }

    #[test]
    fn test_explicit_price_is_kept() {
        let mut r = raw(TradeKind::Trade, Some(Side::Buy), dec!(8), dec!(2), 10);
        r.price = Some(dec!(0.26));
        assert_eq!(normalize_trade(&r).unwrap().price, dec!(0.26));
    }

    #[test]
    fn test_notional_derived_from_price() {
        let mut r = raw(TradeKind::Trade, Some(Side::Sell), dec!(4), dec!(0), 10);
        r.notional = None;
        r.price = Some(dec!(0.6));
        let t = normalize_trade(&r).unwrap();
        assert_eq!(t.notional, dec!(2.4));
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let mut no_market = raw(TradeKind::Trade, Some(Side::Buy), dec!(1), dec!(1), 1);
        no_market.market_id = None;
        assert!(normalize_trade(&no_market).is_none());

        let mut blank_outcome = raw(TradeKind::Trade, Some(Side::Buy), dec!(1), dec!(1), 1);
        blank_outcome.outcome = Some("  ".into());
        assert!(normalize_trade(&blank_outcome).is_none());

        let zero_qty = raw(TradeKind::Trade, Some(Side::Buy), dec!(0), dec!(1), 1);
        assert!(normalize_trade(&zero_qty).is_none());

        let no_side = raw(TradeKind::Trade, None, dec!(1), dec!(1), 1);
        assert!(normalize_trade(&no_side).is_none());

        let merge = raw(TradeKind::Other, Some(Side::Buy), dec!(1), dec!(1), 1);
        assert!(normalize_trade(&merge).is_none());
    }

    #[test]
    fn test_out_of_range_values_are_dropped() {
        let dust = raw(
            TradeKind::Trade,
            Some(Side::Buy),
            dec!(0.0000000000000000000000000001),
            dec!(1000),
            1,
        );
        assert!(normalize_trade(&dust).is_none());

        let mut huge = raw(TradeKind::Trade, Some(Side::Buy), dec!(2), dec!(0), 1);
        huge.notional = None;
        huge.price = Some(Decimal::MAX);
        assert!(normalize_trade(&huge).is_none());

        let records = vec![dust, raw(TradeKind::Trade, Some(Side::Buy), dec!(1), dec!(0.4), 2)];
        assert_eq!(normalize_trades(&records).len(), 1);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let records = vec![
            raw(TradeKind::Trade, Some(Side::Sell), dec!(1), dec!(1), 20),
            raw(TradeKind::Trade, Some(Side::Buy), dec!(2), dec!(1), 10),
            raw(TradeKind::Trade, Some(Side::Buy), dec!(3), dec!(1), 10),
            raw(TradeKind::Trade, Some(Side::Buy), dec!(4), dec!(1), 5),
        ];

        let trades = normalize_trades(&records);
        let quantities: Vec<Decimal> = trades.iter().map(|t| t.quantity).collect();
        assert_eq!(quantities, vec![dec!(4), dec!(2), dec!(3), dec!(1)]);
    }
}
