//! # Domain Models
//!
//! Canonical domain types for the stock dashboard.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Trimmed, uppercase ticker |
//! | [`DateRange`] | Start/end calendar dates sent to the range endpoints |
//! | [`Period`] | Quick-select period (5 days, 1/3/6 months, 1 year) |
//! | [`StockRecord`] | Normalized daily OHLC record |
//! | [`MovingAverage`] | SMA overlay identifiers (5/20/40) |
//!
//! Dates travel as ISO `YYYY-MM-DD` strings and are parsed with the `time`
//! crate. A record date that cannot be parsed is not an error; it orders as
//! [`SENTINEL_DATE`].

mod period;
mod record;
mod symbol;

pub use period::{format_iso_date, parse_iso_date, DateRange, Period, SENTINEL_DATE};
pub use record::{MovingAverage, StockRecord};
pub use symbol::Symbol;
