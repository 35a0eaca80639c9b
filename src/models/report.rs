//! # models::report
//!
//! Output shapes: one [`Form8949Entry`] per closed disposition, rolled up into
//! a [`TaxReport`]. Downstream renderers (form filling, CSV export) consume
//! exactly these structs, so field names follow the report wire format.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::lot::OpenPosition;

/// Sentinel printed in place of an acquisition date that cannot be known.
pub const VARIOUS: &str = "VARIOUS";

const DATE_FORMAT: &str = "%m/%d/%Y";

// ─── Money / Dates ────────────────────────────────────────────────────────────

/// Currency rounding: 2 decimals, half away from zero (`round(x * 100) / 100`).
#[inline]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Renders a UNIX timestamp as `MM/DD/YYYY` (UTC).
pub fn format_tax_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .format(DATE_FORMAT)
        .to_string()
}

/// Dec 31, 23:59:59 UTC of `tax_year`, as a UNIX timestamp.
pub fn tax_year_end(tax_year: i32) -> i64 {
    Utc.with_ymd_and_hms(tax_year, 12, 31, 23, 59, 59)
        .single()
        .map(|dt| dt.timestamp())
        .unwrap_or(i64::MAX)
}

// ─── AcquiredDate ─────────────────────────────────────────────────────────────

/// Acquisition date column: a concrete date, or `VARIOUS` when the matching
/// buy lots were never seen (oversold remainder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AcquiredDate {
    On(NaiveDate),
    Various,
}

impl AcquiredDate {
    pub fn from_timestamp(timestamp: i64) -> Self {
        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .unwrap_or_default()
            .date_naive();
        AcquiredDate::On(date)
    }
}

impl From<AcquiredDate> for String {
    fn from(value: AcquiredDate) -> Self {
        match value {
            AcquiredDate::On(date) => date.format(DATE_FORMAT).to_string(),
            AcquiredDate::Various => VARIOUS.to_string(),
        }
    }
}

impl TryFrom<String> for AcquiredDate {
    type Error = chrono::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == VARIOUS {
            return Ok(AcquiredDate::Various);
        }
        NaiveDate::parse_from_str(&value, DATE_FORMAT).map(AcquiredDate::On)
    }
}

// ─── Form8949Entry ────────────────────────────────────────────────────────────

/// How an entry came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispositionKind {
    /// A SELL (or redemption) matched against a buy lot.
    Sale,
    /// The part of a SELL no tracked lot could cover; zero cost basis.
    Oversold,
    /// A losing-outcome lot written off at zero proceeds.
    Worthless,
}

/// One closed disposition, one row of the form.
///
/// `gain_loss == round_cents(proceeds - cost_basis)` for every entry; for
/// worthless write-offs that is exactly `-cost_basis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form8949Entry {
    pub description: String,
    pub date_acquired: AcquiredDate,
    pub date_sold: String,
    pub proceeds: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub is_long_term: bool,
    pub holding_days: i64,

    // ── Traceability ──────────────────────────────────────────────────────────
    pub market_id: String,
    pub outcome: String,
    /// Tokens disposed of by this entry.
    pub quantity: Decimal,
    pub kind: DispositionKind,
}

// ─── Summary / TaxReport ──────────────────────────────────────────────────────

/// Totals for one holding-period partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub count: usize,
    pub total_proceeds: Decimal,
    pub total_cost_basis: Decimal,
    pub total_gain_loss: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxReport {
    pub tax_year: i32,
    pub short_term: Vec<Form8949Entry>,
    pub long_term: Vec<Form8949Entry>,
    pub short_term_summary: Summary,
    pub long_term_summary: Summary,
    pub total_transactions: usize,
    /// Rounded independently of the partition totals; may differ from
    /// `short + long` by one cent.
    pub total_gain_loss: Decimal,
    pub warnings: Vec<String>,
    pub open_positions: Vec<OpenPosition>,
}
