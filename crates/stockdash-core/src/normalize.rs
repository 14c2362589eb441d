//! Mapping of loosely-typed API records onto [`StockRecord`].
//!
//! Field lookups follow JavaScript truthiness: `null`, `false`, `0`, `NaN`,
//! `""` and missing keys all count as absent. A legitimate zero is therefore
//! indistinguishable from a missing field and falls through to the default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{MovingAverage, StockRecord};

/// Untyped record as received from the API. Any field may be missing or of
/// an unexpected type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStockRecord(Map<String, Value>);

impl RawStockRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Non-object values become an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn truthy(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|value| is_truthy(value))
    }

    fn number(&self, key: &str) -> Option<f64> {
        let value = match self.truthy(key)? {
            Value::Number(number) => number.as_f64()?,
            Value::String(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        (value.is_finite() && value != 0.0).then_some(value)
    }

    fn text(&self, key: &str) -> Option<&str> {
        match self.truthy(key)? {
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn integer(&self, key: &str) -> Option<i64> {
        match self.truthy(key)? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.trunc() as i64)),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for RawStockRecord {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_negative(value: Option<f64>) -> f64 {
    value.filter(|v| *v >= 0.0).unwrap_or(0.0)
}

/// Normalize a raw record without moving-average fields.
pub fn normalize(raw: &RawStockRecord, fallback_symbol: &str) -> StockRecord {
    Normalizer::new(fallback_symbol).normalize(raw)
}

/// Record normalizer bound to the symbol currently being queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    fallback_symbol: String,
    moving_averages: bool,
}

impl Normalizer {
    pub fn new(fallback_symbol: impl Into<String>) -> Self {
        Self {
            fallback_symbol: fallback_symbol.into(),
            moving_averages: false,
        }
    }

    /// When enabled, `sma5`/`sma20`/`sma40` default to `0` instead of being
    /// left absent.
    pub fn with_moving_averages(mut self, enabled: bool) -> Self {
        self.moving_averages = enabled;
        self
    }

    pub fn fallback_symbol(&self) -> &str {
        &self.fallback_symbol
    }

    pub fn normalize(&self, raw: &RawStockRecord) -> StockRecord {
        let close = raw.number("close");
        let price = |key: &str| raw.number(key).or(close).unwrap_or(0.0);
        let average = |average: MovingAverage| {
            self.moving_averages
                .then(|| raw.number(average.field()).unwrap_or(0.0))
        };

        StockRecord {
            id: raw.integer("id").unwrap_or(0),
            symbol: raw
                .text("symbol")
                .map_or_else(|| self.fallback_symbol.clone(), str::to_owned),
            date: raw.text("date").map(str::to_owned).unwrap_or_default(),
            open: price("open"),
            high: price("high"),
            low: price("low"),
            close: close.unwrap_or(0.0),
            volume: non_negative(raw.number("volume")).trunc() as u64,
            dividends: non_negative(raw.number("dividends")),
            stock_splits: non_negative(raw.number("stockSplits")),
            sma5: average(MovingAverage::Sma5),
            sma20: average(MovingAverage::Sma20),
            sma40: average(MovingAverage::Sma40),
        }
    }

    pub fn normalize_all(&self, raw: &[RawStockRecord]) -> Vec<StockRecord> {
        raw.iter().map(|record| self.normalize(record)).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn falsy_values_count_as_missing() {
        let raw = RawStockRecord::new()
            .with("close", 10.0)
            .with("open", 0)
            .with("high", Value::Null)
            .with("low", "")
            .with("symbol", "");
        let record = normalize(&raw, "MSFT");

        assert_eq!(record.open, 10.0);
        assert_eq!(record.high, 10.0);
        assert_eq!(record.low, 10.0);
        assert_eq!(record.symbol, "MSFT");
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let raw = RawStockRecord::from_value(json!({
            "id": "42",
            "close": "151.90",
            "volume": "1200000",
        }));
        let record = normalize(&raw, "AAPL");

        assert_eq!(record.id, 42);
        assert_eq!(record.close, 151.9);
        assert_eq!(record.volume, 1_200_000);
    }

    #[test]
    fn unrepresentable_values_fall_back_to_zero() {
        let raw = RawStockRecord::from_value(json!({
            "volume": -5,
            "dividends": -0.1,
            "stockSplits": "n/a",
        }));
        let record = normalize(&raw, "AAPL");

        assert_eq!(record.volume, 0);
        assert_eq!(record.dividends, 0.0);
        assert_eq!(record.stock_splits, 0.0);
    }

    #[test]
    fn moving_averages_default_to_zero_only_when_expected() {
        let raw = RawStockRecord::from_value(json!({ "close": 5.0, "sma5": 4.5 }));

        let plain = normalize(&raw, "AAPL");
        assert_eq!(plain.sma5, None);
        assert_eq!(plain.sma20, None);

        let with_sma = Normalizer::new("AAPL")
            .with_moving_averages(true)
            .normalize(&raw);
        assert_eq!(with_sma.sma5, Some(4.5));
        assert_eq!(with_sma.sma20, Some(0.0));
        assert_eq!(with_sma.sma40, Some(0.0));
    }

    #[test]
    fn non_object_values_normalize_to_defaults() {
        let raw = RawStockRecord::from_value(json!([1, 2, 3]));
        let record = normalize(&raw, "AAPL");
        assert_eq!(record.symbol, "AAPL");
        assert_eq!(record.date, "");
        assert_eq!(record.close, 0.0);
    }
}
