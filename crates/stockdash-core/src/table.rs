//! Overview table rows.
//!
//! Prices and dividends are shown with two decimals, volume with thousands
//! separators, and stock splits as-is.

use serde::Serialize;

use crate::StockRecord;

pub const HEADERS: [&str; 9] = [
    "Symbol",
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Dividends",
    "Stock Splits",
];

/// Display-ready cells for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: i64,
    pub cells: [String; 9],
}

impl TableRow {
    pub fn from_record(record: &StockRecord) -> Self {
        Self {
            id: record.id,
            cells: [
                record.symbol.clone(),
                record.date.clone(),
                fixed2(record.open),
                fixed2(record.high),
                fixed2(record.low),
                fixed2(record.close),
                group_thousands(record.volume),
                fixed2(record.dividends),
                format_plain(record.stock_splits),
            ],
        }
    }
}

pub fn rows(records: &[StockRecord]) -> Vec<TableRow> {
    records.iter().map(TableRow::from_record).collect()
}

pub fn fixed2(value: f64) -> String {
    format!("{value:.2}")
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Shortest representation: `2` rather than `2.0`, `1.5` as is.
pub fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
