//! # Stockdash Core
//!
//! Data shaping behind the stock dashboard: picking a date range, fetching
//! records for a symbol, normalizing them and projecting them into chart
//! series.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Stock range endpoints and payload decoding |
//! | [`config`] | Environment-driven dashboard configuration |
//! | [`domain`] | Symbol, date range, period and record types |
//! | [`error`] | Core error types |
//! | [`fixtures`] | Sample records and an offline transport |
//! | [`http_client`] | HTTP client abstraction |
//! | [`normalize`] | Raw record normalization |
//! | [`orchestrator`] | Fetch orchestration and displayed state |
//! | [`page`] | Single-symbol chart page |
//! | [`range`] | Quick-select and manual range selection |
//! | [`series`] | Chart series projection |
//! | [`table`] | Overview table formatting |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockdash_core::{
//!     FetchOrchestrator, FailurePolicy, OverlayToggles, ReqwestHttpClient, StockApi, Symbol,
//!     build_series, select_period,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = StockApi::new("http://localhost:8080", Arc::new(ReqwestHttpClient::new()));
//!     let orchestrator = FetchOrchestrator::new(api, FailurePolicy::Clear);
//!
//!     let today = time::OffsetDateTime::now_utc().date();
//!     let range = select_period(30, today)?;
//!     orchestrator.fetch_range(&Symbol::parse("aapl")?, range).await;
//!
//!     let series = build_series(&orchestrator.records(), &OverlayToggles::none());
//!     println!("{} points", series.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! symbol, range ──▶ Range Selector ──▶ Fetch Orchestrator ──▶ HTTP Client
//!                                             │
//!                                             ▼
//!                                     Record Normalizer
//!                                             │
//!                                             ▼
//!                                      Series Builder ──▶ chart / table
//! ```
//!
//! ## Error Handling
//!
//! Fetch failures never escape the orchestrator; they surface as
//! [`FetchOutcome::Failed`] and, depending on [`FailurePolicy`], either
//! clear the displayed records or keep the previous ones.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod fixtures;
pub mod http_client;
pub mod normalize;
pub mod orchestrator;
pub mod page;
pub mod range;
pub mod series;
pub mod table;

pub use api::{decode_payload, RangeEndpoint, StockApi};

pub use config::DashboardConfig;

pub use domain::{
    format_iso_date, parse_iso_date, DateRange, MovingAverage, Period, StockRecord, Symbol,
    SENTINEL_DATE,
};

pub use error::{ConfigError, FetchError, ValidationError};

pub use fixtures::MockStockClient;

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

pub use normalize::{normalize, Normalizer, RawStockRecord};

pub use orchestrator::{DisplaySnapshot, FailurePolicy, FetchOrchestrator, FetchOutcome};

pub use page::{ChartView, PageConfig, SinglePage};

pub use range::{select_period, Clock, FixedClock, RangeSelector, SystemClock};

pub use series::{
    build_series, simple_moving_average, sort_chronologically, OverlaySeries, OverlayToggles,
    Point, SeriesBuilder, SeriesSet,
};

pub use table::TableRow;
