//! # models::trade
//!
//! Defines [`RawTrade`], the activity record exactly as the upstream history
//! feed hands it to us, and [`Trade`], the canonical shape the FIFO engine
//! consumes after normalisation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Kind / Side ──────────────────────────────────────────────────────────────

/// What sort of activity a raw record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeKind {
    /// A fill on the order book.
    #[default]
    Trade,
    /// Payout of a resolved market, settled 1:1 against the winning outcome.
    Redeem,
    /// Anything else the feed emits (splits, merges, rewards, ...).
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

// ─── RawTrade ─────────────────────────────────────────────────────────────────

/// One record of trade history before normalisation.
///
/// Every field except `timestamp` is optional because partial upstream data is
/// expected; the normaliser decides what is usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrade {
    /// Event time, UNIX seconds.
    pub timestamp: i64,

    #[serde(rename = "type", default)]
    pub kind: TradeKind,

    /// Absent for `REDEEM`.
    #[serde(default)]
    pub side: Option<Side>,

    #[serde(default, alias = "conditionId")]
    pub market_id: Option<String>,

    #[serde(default)]
    pub outcome: Option<String>,

    /// Number of outcome tokens filled.
    #[serde(default, alias = "size")]
    pub quantity: Option<Decimal>,

    /// Cash value of the fill.
    #[serde(default, alias = "usdcSize")]
    pub notional: Option<Decimal>,

    /// Unit price; derived from `notional / quantity` when zero or missing.
    #[serde(default)]
    pub price: Option<Decimal>,

    #[serde(default, alias = "transactionHash")]
    pub reference: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
}

// ─── PositionKey ──────────────────────────────────────────────────────────────

/// Identifies one fungible inventory bucket: a single outcome of a single
/// market.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionKey {
    pub market_id: String,
    pub outcome: String,
}

impl std::fmt::Display for PositionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.market_id, self.outcome)
    }
}

// ─── Trade ────────────────────────────────────────────────────────────────────

/// A normalised BUY or SELL. Immutable once built.
///
/// Invariant: `quantity > 0`, so `notional / quantity` is always defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub market_id: String,
    pub outcome: String,
    pub side: Side,
    pub quantity: Decimal,
    pub notional: Decimal,
    pub price: Decimal,
    pub timestamp: i64,
    pub title: String,
    pub reference: String,
}

impl Trade {
    pub fn position_key(&self) -> PositionKey {
        PositionKey {
            market_id: self.market_id.clone(),
            outcome: self.outcome.clone(),
        }
    }

    /// Cash per token for this fill. Falls back to `price` when the
    /// division is out of range.
    #[inline]
    pub fn unit_value(&self) -> Decimal {
        self.notional.checked_div(self.quantity).unwrap_or(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_activity_feed_aliases() {
        let raw: RawTrade = serde_json::from_str(
            r#"{
                "timestamp": 1700000000,
                "type": "TRADE",
                "side": "BUY",
                "conditionId": "0xabc",
                "outcome": "Yes",
                "size": 12.5,
                "usdcSize": "6.25",
                "transactionHash": "0xdead",
                "title": "Will it rain?"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.kind, TradeKind::Trade);
        assert_eq!(raw.side, Some(Side::Buy));
        assert_eq!(raw.market_id.as_deref(), Some("0xabc"));
        assert_eq!(raw.quantity, Some(dec!(12.5)));
        assert_eq!(raw.notional, Some(dec!(6.25)));
        assert_eq!(raw.price, None);
        assert_eq!(raw.reference.as_deref(), Some("0xdead"));
    }

    #[test]
    fn test_type_defaults_and_unknown_kinds() {
        let plain: RawTrade = serde_json::from_str(r#"{"timestamp": 1}"#).unwrap();
        assert_eq!(plain.kind, TradeKind::Trade);

        let merge: RawTrade = serde_json::from_str(r#"{"timestamp": 1, "type": "MERGE"}"#).unwrap();
        assert_eq!(merge.kind, TradeKind::Other);

        let redeem: RawTrade = serde_json::from_str(r#"{"timestamp": 1, "type": "REDEEM"}"#).unwrap();
        assert_eq!(redeem.kind, TradeKind::Redeem);
    }

    #[test]
    fn test_unit_value_falls_back_to_price_when_out_of_range() {
        let trade = Trade {
            market_id: "m1".into(),
            outcome:   "Yes".into(),
            side:      Side::Buy,
            quantity:  dec!(0.0000000000000000000000000001),
            notional:  dec!(1000),
            price:     dec!(0.5),
            timestamp: 1,
            title:     String::new(),
            reference: String::new(),
        };
        assert_eq!(trade.unit_value(), dec!(0.5));

        let normal = Trade { quantity: dec!(4), notional: dec!(1), ..trade };
        assert_eq!(normal.unit_value(), dec!(0.25));
    }

    #[test]
    fn test_position_keys_order_by_market_then_outcome() {
        let a = PositionKey { market_id: "m1".into(), outcome: "Yes".into() };
        let b = PositionKey { market_id: "m1".into(), outcome: "No".into() };
        let c = PositionKey { market_id: "m0".into(), outcome: "Yes".into() };
        let mut keys = vec![a.clone(), b.clone(), c.clone()];
        keys.sort();
        assert_eq!(keys, vec![c, b, a]);
    }
}
