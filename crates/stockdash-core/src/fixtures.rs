//! Built-in sample records for offline runs.
//!
//! [`MockStockClient`] answers the range endpoints from these records so the
//! whole fetch path can run without a backend.

use std::future::Future;
use std::pin::Pin;

use time::macros::date;
use time::Date;

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::{parse_iso_date, DateRange, StockRecord};

/// Date of the newest sample record.
pub const SAMPLE_TODAY: Date = date!(2025 - 02 - 22);

#[allow(clippy::too_many_arguments)]
fn sample(
    id: i64,
    symbol: &str,
    date: &str,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
    dividends: f64,
) -> StockRecord {
    StockRecord {
        id,
        symbol: symbol.to_owned(),
        date: date.to_owned(),
        open,
        high,
        low,
        close,
        volume,
        dividends,
        stock_splits: 0.0,
        sma5: None,
        sma20: None,
        sma40: None,
    }
}

/// One record per symbol for the overview table.
pub fn home_records() -> Vec<StockRecord> {
    vec![
        sample(1, "AAPL", "2025-02-20", 150.25, 152.75, 149.80, 151.90, 1_200_000, 0.23),
        sample(2, "GOOGL", "2025-02-20", 2750.10, 2780.50, 2740.30, 2765.80, 800_000, 0.0),
        sample(3, "TSLA", "2025-02-20", 900.50, 915.20, 895.75, 910.30, 1_500_000, 0.0),
    ]
}

/// Three consecutive AAPL sessions for the single-symbol chart.
pub fn single_records() -> Vec<StockRecord> {
    vec![
        sample(1, "AAPL", "2025-02-20", 150.25, 152.75, 149.80, 151.90, 1_200_000, 0.23),
        sample(2, "AAPL", "2025-02-21", 151.90, 153.20, 150.50, 152.80, 1_300_000, 0.0),
        sample(3, "AAPL", "2025-02-22", 152.80, 155.00, 151.75, 154.30, 1_400_000, 0.0),
    ]
}

/// Every sample record, AAPL history first.
pub fn all_records() -> Vec<StockRecord> {
    let mut records = single_records();
    records.extend(
        home_records()
            .into_iter()
            .filter(|record| record.symbol != "AAPL"),
    );
    records
}

/// Offline transport serving [`all_records`] filtered by symbol and range.
#[derive(Debug, Clone)]
pub struct MockStockClient {
    records: Vec<StockRecord>,
}

impl Default for MockStockClient {
    fn default() -> Self {
        Self::new(all_records())
    }
}

impl MockStockClient {
    pub fn new(records: Vec<StockRecord>) -> Self {
        Self { records }
    }

    fn respond(&self, url: &str) -> Result<HttpResponse, HttpError> {
        let Some(symbol) = path_symbol(url) else {
            return Ok(HttpResponse::with_status(404, "unknown endpoint"));
        };

        let range = match (query_param(url, "startDate"), query_param(url, "endDate")) {
            (Some(start), Some(end)) => match DateRange::parse(&start, &end) {
                Ok(range) => range,
                Err(error) => return Ok(HttpResponse::with_status(400, error.to_string())),
            },
            _ => return Ok(HttpResponse::with_status(400, "startDate and endDate are required")),
        };

        let matching: Vec<&StockRecord> = self
            .records
            .iter()
            .filter(|record| record.symbol.eq_ignore_ascii_case(&symbol))
            .filter(|record| {
                parse_iso_date(&record.date)
                    .map(|date| range.contains(date))
                    .unwrap_or(false)
            })
            .collect();

        let body = serde_json::to_string(&matching)
            .map_err(|error| HttpError::non_retryable(error.to_string()))?;
        Ok(HttpResponse::ok_json(body))
    }
}

impl HttpClient for MockStockClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move { self.respond(&request.url) })
    }
}

fn path_symbol(url: &str) -> Option<String> {
    let path = url.split('?').next()?;
    let rest = path.split("/api/stocks/symbol/").nth(1)?;
    let segment = rest.split('/').next()?;
    urlencoding::decode(segment).ok().map(|symbol| symbol.into_owned())
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}
