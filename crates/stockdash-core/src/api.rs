//! Client for the stock range endpoints.
//!
//! | Endpoint | Path |
//! |----------|------|
//! | [`RangeEndpoint::Unpaginated`] | `/api/stocks/symbol/{symbol}/range-no-pagination` |
//! | [`RangeEndpoint::Paginated`] | `/api/stocks/symbol/{symbol}/range` |
//!
//! Both take `startDate` and `endDate` as ISO dates. The response is either
//! a bare JSON array of records or an object carrying the array under one of
//! [`ENVELOPE_FIELDS`].

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest};
use crate::normalize::RawStockRecord;
use crate::{DateRange, FetchError, Symbol};

/// Object fields that may hold the record list in an envelope response.
pub const ENVELOPE_FIELDS: [&str; 2] = ["content", "data"];

/// Which range endpoint variant to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeEndpoint {
    #[default]
    Unpaginated,
    Paginated { page: u32, size: u32 },
}

/// Stock API client bound to one base URL and transport.
#[derive(Clone)]
pub struct StockApi {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    endpoint: RangeEndpoint,
    timeout_ms: u64,
}

impl StockApi {
    pub fn new(base_url: impl Into<String>, http_client: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            http_client,
            endpoint: RangeEndpoint::default(),
            timeout_ms: 3_000,
        }
    }

    pub fn with_endpoint(mut self, endpoint: RangeEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn endpoint(&self) -> RangeEndpoint {
        self.endpoint
    }

    /// Build the GET request for `symbol` over `range`.
    pub fn range_request(&self, symbol: &Symbol, range: &DateRange) -> HttpRequest {
        let path = match self.endpoint {
            RangeEndpoint::Unpaginated => "range-no-pagination",
            RangeEndpoint::Paginated { .. } => "range",
        };
        let url = format!(
            "{}/api/stocks/symbol/{}/{path}",
            self.base_url,
            urlencoding::encode(symbol.as_str())
        );

        let request = HttpRequest::get(url)
            .with_query("startDate", &range.start_iso())
            .with_query("endDate", &range.end_iso())
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        match self.endpoint {
            RangeEndpoint::Unpaginated => request,
            RangeEndpoint::Paginated { page, size } => request
                .with_query("page", &page.to_string())
                .with_query("size", &size.to_string()),
        }
    }

    /// Fetch the raw records for `symbol` over `range`.
    pub async fn fetch_raw(
        &self,
        symbol: &Symbol,
        range: &DateRange,
    ) -> Result<Vec<RawStockRecord>, FetchError> {
        let request = self.range_request(symbol, range);
        debug!(url = %request.url, "requesting stock range");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| FetchError::Transport {
                message: error.message().to_owned(),
                retryable: error.retryable(),
            })?;

        if !response.is_success() {
            return Err(FetchError::Status {
                status: response.status,
            });
        }

        decode_payload(&response.body)
    }
}

/// Decode a range response body into raw records.
///
/// Array elements that are not objects become empty records rather than
/// failing the whole payload.
pub fn decode_payload(body: &str) -> Result<Vec<RawStockRecord>, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|error| FetchError::Parse(error.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => ENVELOPE_FIELDS
            .iter()
            .find_map(|field| match map.remove(*field) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                FetchError::Shape(format!(
                    "object payload has no list under {}",
                    ENVELOPE_FIELDS.join(" or ")
                ))
            })?,
        other => {
            return Err(FetchError::Shape(format!(
                "expected a list or an envelope object, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(items.into_iter().map(RawStockRecord::from_value).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
