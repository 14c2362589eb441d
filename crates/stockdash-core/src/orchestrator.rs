//! Fetch orchestration for a single displayed record slot.
//!
//! Each call to [`FetchOrchestrator::fetch_range`] is independent: nothing is
//! cancelled or de-duplicated, so overlapping fetches may complete in any
//! order. Every call is tagged with a generation number and only the most
//! recently issued one may touch the display; older completions are dropped
//! as [`FetchOutcome::Superseded`].
//!
//! The loading flag is a count of in-flight fetches held by an RAII guard,
//! so it drops back to idle on every exit path, including a future that is
//! dropped before completion.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::StockApi;
use crate::normalize::Normalizer;
use crate::{DateRange, FetchError, StockRecord, Symbol};

/// What happens to the displayed records when a fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Replace the display with an empty record list.
    #[default]
    Clear,
    /// Keep the records from the last successful fetch.
    RetainStale,
}

impl FailurePolicy {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "clear" => Some(Self::Clear),
            "retain" | "retain_stale" | "retain-stale" => Some(Self::RetainStale),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::RetainStale => "retain",
        }
    }
}

/// Copy of the displayed state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySnapshot {
    /// Symbol and range the displayed records were requested for.
    pub symbol: Option<Symbol>,
    pub range: Option<DateRange>,
    pub records: Vec<StockRecord>,
    /// Generation of the last fetch applied to the display, `0` if none.
    pub generation: u64,
    /// Error from the last applied fetch, cleared on success.
    pub last_error: Option<FetchError>,
}

/// Result of one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied { generation: u64, records: usize },
    Failed { generation: u64, error: FetchError },
    Superseded { generation: u64 },
}

impl FetchOutcome {
    pub const fn generation(&self) -> u64 {
        match self {
            Self::Applied { generation, .. }
            | Self::Failed { generation, .. }
            | Self::Superseded { generation } => *generation,
        }
    }

    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

#[derive(Debug, Default)]
struct Shared {
    display: Mutex<DisplaySnapshot>,
    issued: AtomicU64,
    in_flight: AtomicUsize,
}

/// Marks one fetch as in flight until dropped.
struct LoadingGuard {
    shared: Arc<Shared>,
}

impl LoadingGuard {
    fn acquire(shared: &Arc<Shared>) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        Self {
            shared: Arc::clone(shared),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Issues range fetches and owns the displayed records.
///
/// Clones share the same display slot, loading flag and generation counter.
#[derive(Clone)]
pub struct FetchOrchestrator {
    api: StockApi,
    policy: FailurePolicy,
    moving_averages: bool,
    shared: Arc<Shared>,
}

impl FetchOrchestrator {
    pub fn new(api: StockApi, policy: FailurePolicy) -> Self {
        Self {
            api,
            policy,
            moving_averages: false,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Normalize records with SMA fields defaulted to zero.
    pub fn with_moving_averages(mut self, enabled: bool) -> Self {
        self.moving_averages = enabled;
        self
    }

    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn api(&self) -> &StockApi {
        &self.api
    }

    pub fn is_loading(&self) -> bool {
        self.shared.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Generation of the most recently issued fetch.
    pub fn latest_generation(&self) -> u64 {
        self.shared.issued.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.shared
            .display
            .lock()
            .expect("display lock is not poisoned")
            .clone()
    }

    pub fn records(&self) -> Vec<StockRecord> {
        self.shared
            .display
            .lock()
            .expect("display lock is not poisoned")
            .records
            .clone()
    }

    /// Fetch, normalize and display `symbol` over `range`.
    ///
    /// The generation is taken and the loading flag raised when this is
    /// called, not when the returned future is first polled, so call order
    /// decides which fetch is the latest.
    ///
    /// Never fails: transport, status and payload errors are logged and
    /// reported through [`FetchOutcome::Failed`].
    pub fn fetch_range<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: DateRange,
    ) -> impl Future<Output = FetchOutcome> + Send + 'a {
        let generation = self.shared.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let loading = LoadingGuard::acquire(&self.shared);

        async move {
            let _loading = loading;
            let result = self.api.fetch_raw(symbol, &range).await.map(|raw| {
                Normalizer::new(symbol.as_str())
                    .with_moving_averages(self.moving_averages)
                    .normalize_all(&raw)
            });

            self.apply(generation, symbol, range, result)
        }
    }

    fn apply(
        &self,
        generation: u64,
        symbol: &Symbol,
        range: DateRange,
        result: Result<Vec<StockRecord>, FetchError>,
    ) -> FetchOutcome {
        let mut display = self
            .shared
            .display
            .lock()
            .expect("display lock is not poisoned");

        let latest = self.shared.issued.load(Ordering::SeqCst);
        if generation != latest {
            warn!(
                %symbol,
                %range,
                generation,
                latest,
                "discarding superseded stock response"
            );
            return FetchOutcome::Superseded { generation };
        }

        display.generation = generation;
        match result {
            Ok(records) => {
                info!(%symbol, %range, generation, records = records.len(), "stock range applied");
                let count = records.len();
                display.symbol = Some(symbol.clone());
                display.range = Some(range);
                display.records = records;
                display.last_error = None;
                FetchOutcome::Applied {
                    generation,
                    records: count,
                }
            }
            Err(error) => {
                warn!(
                    %symbol,
                    %range,
                    generation,
                    code = error.code(),
                    policy = self.policy.as_str(),
                    "stock range fetch failed: {error}"
                );
                if self.policy == FailurePolicy::Clear {
                    display.symbol = Some(symbol.clone());
                    display.range = Some(range);
                    display.records.clear();
                }
                display.last_error = Some(error.clone());
                FetchOutcome::Failed { generation, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::{pending, Future};
    use std::pin::Pin;
    use std::time::Duration;

    use time::macros::date;

    use super::*;
    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

    struct NeverResponds;

    impl HttpClient for NeverResponds {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(pending())
        }
    }

    fn range() -> DateRange {
        DateRange::new(date!(2025 - 02 - 20), date!(2025 - 02 - 22))
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!(FailurePolicy::parse("Clear"), Some(FailurePolicy::Clear));
        assert_eq!(
            FailurePolicy::parse("retain-stale"),
            Some(FailurePolicy::RetainStale)
        );
        assert_eq!(FailurePolicy::parse("keep"), None);
    }

    #[test]
    fn default_policy_clears_on_failure() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Clear);
    }

    #[test]
    fn guard_counts_nested_fetches() {
        let shared = Arc::new(Shared::default());
        let first = LoadingGuard::acquire(&shared);
        let second = LoadingGuard::acquire(&shared);
        assert_eq!(shared.in_flight.load(Ordering::SeqCst), 2);
        drop(first);
        assert_eq!(shared.in_flight.load(Ordering::SeqCst), 1);
        drop(second);
        assert_eq!(shared.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropping_an_in_flight_fetch_resets_loading() {
        let api = StockApi::new("http://api.test", Arc::new(NeverResponds));
        let orchestrator = FetchOrchestrator::new(api, FailurePolicy::Clear);
        let symbol = Symbol::parse("AAPL").expect("valid");

        let fetch = orchestrator.fetch_range(&symbol, range());
        let timed_out = tokio::time::timeout(Duration::from_millis(20), fetch).await;

        assert!(timed_out.is_err(), "request never resolves");
        assert!(!orchestrator.is_loading());
        assert_eq!(orchestrator.snapshot().generation, 0);
    }
}
