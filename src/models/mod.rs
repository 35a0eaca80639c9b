//! Domain models shared across the entire Polytax system.

pub mod lot;
pub mod report;
pub mod trade;

pub use lot::{InventoryLot, OpenPosition};
pub use report::{AcquiredDate, DispositionKind, Form8949Entry, Summary, TaxReport};
pub use trade::{PositionKey, RawTrade, Side, Trade, TradeKind};
