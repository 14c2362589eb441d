use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

use super::period::{parse_iso_date, SENTINEL_DATE};
use crate::ValidationError;

/// Canonical daily price record after normalization.
///
/// `date` keeps the literal string received from the API so chart labels
/// match what the backend sent; use [`StockRecord::calendar_date`] for
/// ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    pub id: i64,
    pub symbol: String,
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub dividends: f64,
    pub stock_splits: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma5: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma20: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma40: Option<f64>,
}

impl StockRecord {
    /// The record date as a calendar date.
    ///
    /// Only the leading `YYYY-MM-DD` is considered, so timestamps such as
    /// `2025-02-20T00:00:00` resolve to their day. Empty or unparseable dates
    /// resolve to [`SENTINEL_DATE`].
    pub fn calendar_date(&self) -> Date {
        self.date
            .get(..10)
            .and_then(|prefix| parse_iso_date(prefix).ok())
            .unwrap_or(SENTINEL_DATE)
    }

    pub fn moving_average(&self, average: MovingAverage) -> Option<f64> {
        match average {
            MovingAverage::Sma5 => self.sma5,
            MovingAverage::Sma20 => self.sma20,
            MovingAverage::Sma40 => self.sma40,
        }
    }

    /// `[open, high, low, close]` as consumed by candlestick charts.
    pub fn ohlc(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }
}

/// Trailing simple moving averages the backend may precompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovingAverage {
    Sma5,
    Sma20,
    Sma40,
}

impl MovingAverage {
    pub const ALL: [MovingAverage; 3] = [Self::Sma5, Self::Sma20, Self::Sma40];

    pub const fn window(self) -> usize {
        match self {
            Self::Sma5 => 5,
            Self::Sma20 => 20,
            Self::Sma40 => 40,
        }
    }

    /// Field name used by the API payload.
    pub const fn field(self) -> &'static str {
        match self {
            Self::Sma5 => "sma5",
            Self::Sma20 => "sma20",
            Self::Sma40 => "sma40",
        }
    }
}

impl Display for MovingAverage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

impl FromStr for MovingAverage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma5" => Ok(Self::Sma5),
            "sma20" => Ok(Self::Sma20),
            "sma40" => Ok(Self::Sma40),
            _ => Err(ValidationError::InvalidMovingAverage {
                value: s.to_owned(),
            }),
        }
    }
}
