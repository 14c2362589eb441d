//! Single-symbol chart page.
//!
//! A [`SinglePage`] wires the range selector, the fetch orchestrator and the
//! series builder together. Every input that changes what should be shown
//! (search submit, period button, date edit) issues a fetch; overlay toggles
//! only change which series are emitted from the records already held.

use serde::Serialize;
use time::Date;

use crate::api::StockApi;
use crate::config::DashboardConfig;
use crate::orchestrator::{FailurePolicy, FetchOrchestrator, FetchOutcome};
use crate::range::{Clock, RangeSelector, SystemClock};
use crate::series::{OverlayToggles, SeriesBuilder, SeriesSet};
use crate::{
    DateRange, FetchError, MovingAverage, Period, StockRecord, Symbol, ValidationError,
};

/// Initial state handed to a page at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    pub default_symbol: Symbol,
    pub default_period: Period,
    pub overlays: OverlayToggles,
    pub failure_policy: FailurePolicy,
    pub expect_moving_averages: bool,
}

impl PageConfig {
    pub fn from_dashboard(config: &DashboardConfig) -> Self {
        Self {
            default_symbol: config.default_symbol.clone(),
            default_period: config.default_period,
            overlays: OverlayToggles::none(),
            failure_policy: config.failure_policy,
            expect_moving_averages: false,
        }
    }

    pub fn with_overlays(mut self, overlays: OverlayToggles) -> Self {
        self.overlays = overlays;
        self
    }

    pub fn with_moving_averages(mut self, expected: bool) -> Self {
        self.expect_moving_averages = expected;
        self
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self::from_dashboard(&DashboardConfig::default())
    }
}

/// What the chart area should render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartView {
    NoData { symbol: Symbol },
    Chart { symbol: Symbol, series: SeriesSet },
}

impl ChartView {
    pub fn series(&self) -> Option<&SeriesSet> {
        match self {
            Self::NoData { .. } => None,
            Self::Chart { series, .. } => Some(series),
        }
    }
}

pub struct SinglePage<C = SystemClock> {
    symbol: Symbol,
    selector: RangeSelector<C>,
    overlays: OverlayToggles,
    orchestrator: FetchOrchestrator,
}

impl<C: Clock> SinglePage<C> {
    pub fn new(config: PageConfig, api: StockApi, clock: C) -> Result<Self, ValidationError> {
        let selector = RangeSelector::new(clock, config.default_period)?;
        let orchestrator = FetchOrchestrator::new(api, config.failure_policy)
            .with_moving_averages(config.expect_moving_averages);

        Ok(Self {
            symbol: config.default_symbol,
            selector,
            overlays: config.overlays,
            orchestrator,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn range(&self) -> DateRange {
        self.selector.current()
    }

    pub fn overlays(&self) -> &OverlayToggles {
        &self.overlays
    }

    /// Shared handle for issuing fetches from other tasks.
    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    pub fn is_loading(&self) -> bool {
        self.orchestrator.is_loading()
    }

    pub fn records(&self) -> Vec<StockRecord> {
        self.orchestrator.records()
    }

    /// Fetch the current symbol and range.
    pub async fn refresh(&self) -> FetchOutcome {
        self.orchestrator
            .fetch_range(&self.symbol, self.selector.current())
            .await
    }

    /// Search box submit. Blank input is ignored and returns `Ok(None)`.
    pub async fn search(&mut self, input: &str) -> Result<Option<FetchOutcome>, ValidationError> {
        let Some(symbol) = Symbol::from_search_input(input)? else {
            return Ok(None);
        };
        self.symbol = symbol;
        Ok(Some(self.refresh().await))
    }

    pub async fn select_period(&mut self, period: Period) -> Result<FetchOutcome, ValidationError> {
        self.selector.select(period)?;
        Ok(self.refresh().await)
    }

    pub async fn set_start(&mut self, start: Date) -> FetchOutcome {
        self.selector.set_start(start);
        self.refresh().await
    }

    pub async fn set_end(&mut self, end: Date) -> FetchOutcome {
        self.selector.set_end(end);
        self.refresh().await
    }

    pub async fn set_range(&mut self, range: DateRange) -> FetchOutcome {
        self.selector.set_range(range);
        self.refresh().await
    }

    /// Flip an overlay without refetching. Returns whether it is now enabled.
    pub fn toggle_overlay(&mut self, average: MovingAverage) -> bool {
        self.overlays.toggle(average)
    }

    /// Error from the last applied fetch, if it failed.
    pub fn last_error(&self) -> Option<FetchError> {
        self.orchestrator.snapshot().last_error
    }

    /// Chart for the displayed records, labelled with the symbol they were
    /// fetched for. After a failed search under [`FailurePolicy::RetainStale`]
    /// that is the previous symbol, not [`SinglePage::symbol`].
    pub fn view(&self) -> ChartView {
        let snapshot = self.orchestrator.snapshot();
        let symbol = snapshot.symbol.unwrap_or_else(|| self.symbol.clone());
        if snapshot.records.is_empty() {
            return ChartView::NoData { symbol };
        }

        ChartView::Chart {
            symbol,
            series: SeriesBuilder::new(&snapshot.records).build(&self.overlays),
        }
    }
}
