//! # models::lot
//!
//! Inventory held by the FIFO engine.
//!
//! `InventoryLot` = one acquisition, consumed from the head of its queue
//! `OpenPosition` = snapshot of every lot still open for one position key

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::trade::{PositionKey, Trade};

// ─── InventoryLot ─────────────────────────────────────────────────────────────

/// A still-or-partially-open acquisition.
///
/// `remaining_quantity` only ever goes down; `unit_cost` is fixed at the
/// moment the BUY was processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLot {
    pub acquired_at: i64,
    pub remaining_quantity: Decimal,
    pub unit_cost: Decimal,
    /// Cost of the whole original acquisition, before any sells.
    pub total_cost: Decimal,
    pub title: String,
    pub outcome: String,
    pub reference: String,
}

impl InventoryLot {
    /// Opens a lot from a normalised BUY.
    pub fn from_buy(trade: &Trade) -> Self {
        Self {
            acquired_at:        trade.timestamp,
            remaining_quantity: trade.quantity,
            unit_cost:          trade.unit_value(),
            total_cost:         trade.notional,
            title:              trade.title.clone(),
            outcome:            trade.outcome.clone(),
            reference:          trade.reference.clone(),
        }
    }

    /// Cost basis attributable to what is left of this lot (unrounded).
    #[inline]
    pub fn remaining_cost(&self) -> Decimal {
        self.remaining_quantity * self.unit_cost
    }
}

// ─── OpenPosition ─────────────────────────────────────────────────────────────

/// Everything still held for one position key once all trades are processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenPosition {
    pub market_id: String,
    pub outcome: String,
    pub title: String,
    pub total_quantity: Decimal,
    pub total_cost_basis: Decimal,
    pub lots: Vec<InventoryLot>,
}

impl OpenPosition {
    /// Aggregates the surviving lots of `key`. Returns `None` for an empty
    /// queue, since there is nothing left to report.
    pub fn from_lots(key: &PositionKey, lots: Vec<InventoryLot>) -> Option<Self> {
        let title = lots.first()?.title.clone();
        let total_quantity = lots.iter().map(|l| l.remaining_quantity).sum();
        let total_cost_basis = lots.iter().map(InventoryLot::remaining_cost).sum();

        Some(Self {
            market_id: key.market_id.clone(),
            outcome: key.outcome.clone(),
            title,
            total_quantity,
            total_cost_basis,
            lots,
        })
    }

    pub fn position_key(&self) -> PositionKey {
        PositionKey {
            market_id: self.market_id.clone(),
            outcome: self.outcome.clone(),
        }
    }
}
