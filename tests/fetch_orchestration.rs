//! Behavior-driven tests for fetch orchestration
//!
//! These tests verify the loading flag, failure policies and
//! last-request-wins handling when overlapping fetches complete out of order.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use stockdash_core::{
    DateRange, FailurePolicy, FetchError, FetchOrchestrator, FetchOutcome, HttpClient, HttpError,
    HttpRequest, HttpResponse, MockStockClient, StockApi, Symbol,
};
use time::macros::date;
use tokio::sync::oneshot;

type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Answers every request with the same canned result.
struct ScriptedClient {
    result: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(result: Result<HttpResponse, HttpError>) -> Self {
        Self {
            result,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl HttpClient for ScriptedClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> ResponseFuture<'a> {
        self.requests.lock().expect("lock").push(request.url);
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

/// Holds each symbol's response until the test releases it.
#[derive(Default)]
struct GatedClient {
    gates: Mutex<HashMap<String, oneshot::Receiver<HttpResponse>>>,
}

impl GatedClient {
    fn gate(&self, symbol: &str) -> oneshot::Sender<HttpResponse> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .expect("lock")
            .insert(symbol.to_owned(), receiver);
        sender
    }
}

impl HttpClient for GatedClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> ResponseFuture<'a> {
        let symbol = request
            .url
            .split("/api/stocks/symbol/")
            .nth(1)
            .and_then(|rest| rest.split('/').next())
            .unwrap_or_default()
            .to_owned();
        let receiver = self.gates.lock().expect("lock").remove(&symbol);

        Box::pin(async move {
            match receiver {
                Some(receiver) => receiver
                    .await
                    .map_err(|_| HttpError::new("gate dropped")),
                None => Ok(HttpResponse::with_status(404, "no gate")),
            }
        })
    }
}

fn range() -> DateRange {
    DateRange::new(date!(2025 - 02 - 20), date!(2025 - 02 - 22))
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn orchestrator(client: Arc<dyn HttpClient>, policy: FailurePolicy) -> FetchOrchestrator {
    FetchOrchestrator::new(StockApi::new("http://stocks.test", client), policy)
}

async fn wait_for_generation(orchestrator: &FetchOrchestrator, generation: u64) {
    while orchestrator.latest_generation() < generation {
        tokio::task::yield_now().await;
    }
}

// =============================================================================
// Fetch: Success Path
// =============================================================================

#[tokio::test]
async fn when_fetch_succeeds_records_replace_the_display() {
    // Given: An orchestrator over the sample records
    let orchestrator = orchestrator(Arc::new(MockStockClient::default()), FailurePolicy::Clear);
    assert!(!orchestrator.is_loading());

    // When: AAPL is fetched for three days
    let outcome = orchestrator.fetch_range(&symbol("aapl"), range()).await;

    // Then: Three records are displayed and the loading flag is back to idle
    assert_eq!(
        outcome,
        FetchOutcome::Applied {
            generation: 1,
            records: 3
        }
    );
    assert!(!orchestrator.is_loading());
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.records.len(), 3);
    assert_eq!(snapshot.symbol, Some(symbol("AAPL")));
    assert_eq!(snapshot.range, Some(range()));
    assert_eq!(snapshot.last_error, None);
}

#[tokio::test]
async fn when_request_is_issued_symbol_is_uppercased_and_dates_are_iso() {
    // Given: A client recording request URLs
    let client = Arc::new(ScriptedClient::new(Ok(HttpResponse::ok_json("[]"))));
    let orchestrator = orchestrator(client.clone(), FailurePolicy::Clear);

    // When: A lowercase symbol is fetched
    orchestrator.fetch_range(&symbol(" msft "), range()).await;

    // Then: One GET was issued with the canonical URL
    let requests = client.requests.lock().expect("lock").clone();
    assert_eq!(
        requests,
        ["http://stocks.test/api/stocks/symbol/MSFT/range-no-pagination?startDate=2025-02-20&endDate=2025-02-22"]
    );
}

#[tokio::test]
async fn when_payload_is_an_envelope_records_are_unwrapped_and_normalized() {
    // Given: A paginated-style envelope with a sparse record
    let body = r#"{"content": [{"date": "2025-02-21", "close": 12.5}], "totalElements": 1}"#;
    let client = Arc::new(ScriptedClient::new(Ok(HttpResponse::ok_json(body))));
    let orchestrator = orchestrator(client, FailurePolicy::Clear);

    // When: The range is fetched
    let outcome = orchestrator.fetch_range(&symbol("TSLA"), range()).await;

    // Then: The record is normalized with the queried symbol as fallback
    assert!(outcome.is_applied());
    let records = orchestrator.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].symbol, "TSLA");
    assert_eq!(records[0].open, 12.5);
}

// =============================================================================
// Fetch: Failure Policies
// =============================================================================

#[tokio::test]
async fn when_server_returns_500_under_clear_policy_display_is_emptied() {
    // Given: A display already showing two AAPL records
    let gated = Arc::new(GatedClient::default());
    let orchestrator = orchestrator(gated.clone(), FailurePolicy::Clear);
    gated
        .gate("AAPL")
        .send(HttpResponse::ok_json(r#"[{"close": 1.0}, {"close": 2.0}]"#))
        .expect("receiver alive");
    assert!(orchestrator
        .fetch_range(&symbol("AAPL"), range())
        .await
        .is_applied());

    // When: The next fetch hits a 500
    gated
        .gate("AAPL")
        .send(HttpResponse::with_status(500, "boom"))
        .expect("receiver alive");
    let outcome = orchestrator.fetch_range(&symbol("AAPL"), range()).await;

    // Then: No error escapes, loading is idle and nothing is displayed
    assert!(matches!(
        outcome,
        FetchOutcome::Failed {
            error: FetchError::Status { status: 500 },
            ..
        }
    ));
    assert!(!orchestrator.is_loading());
    assert!(orchestrator.records().is_empty());
    assert_eq!(
        orchestrator.snapshot().last_error,
        Some(FetchError::Status { status: 500 })
    );
}

#[tokio::test]
async fn when_server_returns_500_under_retain_policy_previous_records_stay() {
    // Given: A client that succeeds once and then fails
    let gated = Arc::new(GatedClient::default());
    let orchestrator = orchestrator(gated.clone(), FailurePolicy::RetainStale);

    let ok = gated.gate("AAPL");
    let pending = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.fetch_range(&symbol("AAPL"), range()).await }
    });
    wait_for_generation(&orchestrator, 1).await;
    ok.send(HttpResponse::ok_json(r#"[{"close": 1.0}, {"close": 2.0}]"#))
        .expect("receiver alive");
    assert!(pending.await.expect("task").is_applied());

    // When: The following fetch returns HTTP 500
    let failing = gated.gate("AAPL");
    failing
        .send(HttpResponse::with_status(500, "boom"))
        .expect("receiver alive");
    let outcome = orchestrator.fetch_range(&symbol("AAPL"), range()).await;

    // Then: The stale records remain alongside the recorded error
    assert!(matches!(outcome, FetchOutcome::Failed { generation: 2, .. }));
    assert!(!orchestrator.is_loading());
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.records.len(), 2);
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.last_error, Some(FetchError::Status { status: 500 }));
}

#[tokio::test]
async fn when_each_failure_kind_occurs_loading_flag_is_reset() {
    let cases = [
        (Err(HttpError::new("connection refused")), "fetch.transport"),
        (Ok(HttpResponse::with_status(503, "")), "fetch.status"),
        (Ok(HttpResponse::ok_json("{not json")), "fetch.parse"),
        (Ok(HttpResponse::ok_json(r#""a string""#)), "fetch.shape"),
    ];

    for (result, code) in cases {
        // Given: A transport producing one failure kind
        let orchestrator = orchestrator(Arc::new(ScriptedClient::new(result)), FailurePolicy::Clear);

        // When: A fetch runs
        let outcome = orchestrator.fetch_range(&symbol("AAPL"), range()).await;

        // Then: It is reported, not raised, and loading is idle again
        match outcome {
            FetchOutcome::Failed { error, .. } => assert_eq!(error.code(), code),
            other => panic!("expected failure for {code}, got {other:?}"),
        }
        assert!(!orchestrator.is_loading());
    }
}

// =============================================================================
// Fetch: Overlapping Requests
// =============================================================================

#[tokio::test]
async fn when_older_request_completes_last_it_does_not_overwrite_newer_data() {
    // Given: Two gated requests, AAPL issued before MSFT
    let gated = Arc::new(GatedClient::default());
    let orchestrator = orchestrator(gated.clone(), FailurePolicy::Clear);
    let aapl_gate = gated.gate("AAPL");
    let msft_gate = gated.gate("MSFT");

    let aapl = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.fetch_range(&symbol("AAPL"), range()).await }
    });
    wait_for_generation(&orchestrator, 1).await;
    let msft = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.fetch_range(&symbol("MSFT"), range()).await }
    });
    wait_for_generation(&orchestrator, 2).await;
    assert!(orchestrator.is_loading());

    // When: The newer request resolves first and the older one last
    msft_gate
        .send(HttpResponse::ok_json(r#"[{"symbol": "MSFT", "close": 400.0}]"#))
        .expect("receiver alive");
    let msft_outcome = msft.await.expect("task");
    assert!(orchestrator.is_loading(), "AAPL is still in flight");
    aapl_gate
        .send(HttpResponse::ok_json(r#"[{"symbol": "AAPL", "close": 150.0}]"#))
        .expect("receiver alive");
    let aapl_outcome = aapl.await.expect("task");

    // Then: The display shows MSFT and the late AAPL response is dropped
    assert_eq!(
        msft_outcome,
        FetchOutcome::Applied {
            generation: 2,
            records: 1
        }
    );
    assert_eq!(aapl_outcome, FetchOutcome::Superseded { generation: 1 });
    assert!(!orchestrator.is_loading());
    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.symbol, Some(symbol("MSFT")));
    assert_eq!(snapshot.records[0].close, 400.0);
}

#[tokio::test]
async fn when_superseded_request_fails_display_is_untouched() {
    // Given: An applied AAPL display and a stale in-flight TSLA request
    let gated = Arc::new(GatedClient::default());
    let orchestrator = orchestrator(gated.clone(), FailurePolicy::Clear);
    let tsla_gate = gated.gate("TSLA");
    let tsla = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.fetch_range(&symbol("TSLA"), range()).await }
    });
    wait_for_generation(&orchestrator, 1).await;

    let aapl_gate = gated.gate("AAPL");
    aapl_gate
        .send(HttpResponse::ok_json(r#"[{"close": 150.0}]"#))
        .expect("receiver alive");
    assert!(orchestrator
        .fetch_range(&symbol("AAPL"), range())
        .await
        .is_applied());

    // When: The stale request fails
    tsla_gate
        .send(HttpResponse::with_status(500, "boom"))
        .expect("receiver alive");

    // Then: The failure is dropped rather than clearing the newer data
    assert_eq!(
        tsla.await.expect("task"),
        FetchOutcome::Superseded { generation: 1 }
    );
    assert_eq!(orchestrator.records().len(), 1);
    assert_eq!(orchestrator.snapshot().last_error, None);
}

#[tokio::test]
async fn when_futures_are_polled_out_of_call_order_call_order_still_wins() {
    // Given: Two fetches created AAPL first, MSFT second, neither polled yet
    let client = Arc::new(ScriptedClient::new(Ok(HttpResponse::ok_json(
        r#"[{"close": 1.0}]"#,
    ))));
    let orchestrator = orchestrator(client, FailurePolicy::Clear);
    let aapl_symbol = symbol("AAPL");
    let msft_symbol = symbol("MSFT");
    let aapl = orchestrator.fetch_range(&aapl_symbol, range());
    let msft = orchestrator.fetch_range(&msft_symbol, range());

    // Then: Both are already issued and loading
    assert_eq!(orchestrator.latest_generation(), 2);
    assert!(orchestrator.is_loading());

    // When: The later call is driven to completion before the earlier one
    let msft_outcome = msft.await;
    let aapl_outcome = aapl.await;

    // Then: The later call owns the display
    assert_eq!(
        msft_outcome,
        FetchOutcome::Applied {
            generation: 2,
            records: 1
        }
    );
    assert_eq!(aapl_outcome, FetchOutcome::Superseded { generation: 1 });
    assert_eq!(orchestrator.snapshot().symbol, Some(msft_symbol));
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn when_unpolled_fetch_is_dropped_loading_flag_is_released() {
    // Given: A fetch that was created but never awaited
    let client = Arc::new(ScriptedClient::new(Ok(HttpResponse::ok_json("[]"))));
    let orchestrator = orchestrator(client, FailurePolicy::Clear);
    let aapl = symbol("AAPL");
    let pending = orchestrator.fetch_range(&aapl, range());
    assert!(orchestrator.is_loading());

    // When: It is dropped
    drop(pending);

    // Then: Loading is idle and nothing was displayed
    assert!(!orchestrator.is_loading());
    assert_eq!(orchestrator.snapshot().generation, 0);
}

#[tokio::test]
async fn when_fetch_future_is_dropped_loading_flag_is_released() {
    // Given: A request that never resolves
    let gated = Arc::new(GatedClient::default());
    let orchestrator = orchestrator(gated.clone(), FailurePolicy::Clear);
    let _gate = gated.gate("AAPL");

    // When: The caller gives up on it
    let result = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        orchestrator.fetch_range(&symbol("AAPL"), range()),
    )
    .await;

    // Then: The timeout fired and loading is idle again
    assert!(result.is_err());
    assert!(!orchestrator.is_loading());
    assert!(orchestrator.records().is_empty());
}
