//! End-to-end tests for the job pipeline: authentication, idempotent
//! replay, single-flight execution, and URL-mode inputs.

use async_trait::async_trait;
use bloomcast_core::{headers, BloomcastConfig, JobInput, JobRequest, UrlInput};
use bloomcast_engine::{OrderProposal, OrderProposalEngine};
use bloomcast_idempotency::MemoryIdempotencyStore;
use bloomcast_pipeline::{
    JobPipeline, ProposalEngine, Result, StaticWorkbookReader, WorkbookReader,
};
use bloomcast_schema::{Cell, ResolvedTables, Sheet, Workbook};
use bloomcast_signing::{payload_sha256_text, sha256_hex, TaskyardSignature};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "replace_me";

fn fixture_workbook() -> Workbook {
    Workbook::new()
        .with_sheet(
            Sheet::new("History_Client", ["Date", "Product", "Qty"])
                .with_row([Cell::text("2024-03-04"), Cell::text("1001"), Cell::number(6.0)])
                .with_row([Cell::text("2024-03-11"), Cell::text("1001"), Cell::number(4.0)]),
        )
        .with_sheet(
            Sheet::new("History_Peers", ["Date", "Product", "Qty", "Peer"]).with_row([
                Cell::text("2024-03-05"),
                Cell::text("1001"),
                Cell::number(20.0),
                Cell::text("Peer BV"),
            ]),
        )
        .with_sheet(
            Sheet::new("Current_Stock", ["Product", "StockLevel"])
                .with_row([Cell::text("1001"), Cell::number(3.0)]),
        )
        .with_sheet(Sheet::new("Buyer_Recs", ["Product"]).with_row([Cell::text("2001")]))
}

/// Engine wrapper that counts compute executions and can slow them down
struct CountingEngine {
    inner: OrderProposalEngine,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingEngine {
    fn new(calls: Arc<AtomicUsize>, delay: Duration) -> Self {
        Self {
            inner: OrderProposalEngine::new(),
            calls,
            delay,
        }
    }
}

#[async_trait]
impl ProposalEngine for CountingEngine {
    async fn propose(&self, tables: &ResolvedTables) -> Result<Vec<OrderProposal>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.inner.propose(tables)?)
    }
}

struct Harness {
    pipeline: Arc<JobPipeline>,
    store: Arc<MemoryIdempotencyStore>,
    calls: Arc<AtomicUsize>,
}

fn harness_with(
    store: Arc<MemoryIdempotencyStore>,
    reader: Arc<dyn WorkbookReader>,
    delay: Duration,
) -> Harness {
    let config = BloomcastConfig::builder()
        .secret(SECRET)
        .build()
        .expect("valid config");
    let calls = Arc::new(AtomicUsize::new(0));
    let engine = Arc::new(CountingEngine::new(calls.clone(), delay));
    let pipeline = JobPipeline::new(config, store.clone(), reader)
        .expect("pipeline construction")
        .with_engine(engine);
    Harness {
        pipeline: Arc::new(pipeline),
        store,
        calls,
    }
}

fn harness() -> Harness {
    let config = BloomcastConfig::builder().secret(SECRET).build().expect("valid config");
    harness_with(
        Arc::new(MemoryIdempotencyStore::new(config.idempotency_ttl)),
        Arc::new(StaticWorkbookReader::new(fixture_workbook())),
        Duration::ZERO,
    )
}

fn signed_text_request(job_id: &str, key: &str, text: &str) -> JobRequest {
    let ts = chrono::Utc::now().timestamp();
    let signature =
        TaskyardSignature::new(SECRET).sign(ts, job_id, &payload_sha256_text(text));
    JobRequest::new(job_id, ts, key, signature, JobInput::Text(text.to_string()))
}

#[tokio::test]
async fn test_end_to_end_success() {
    let harness = harness();
    let request = signed_text_request("job-0042", "idem-e2e", "orders export");

    let outcome = harness.pipeline.handle(request).await;

    assert_eq!(outcome.status, 200);
    assert!(!outcome.replayed);
    let value: serde_json::Value = serde_json::from_slice(&outcome.body).unwrap();
    assert_eq!(value["result_status"], "review");
    assert_eq!(value["job_id"], "job-0042");
    let proposals = value["proposals"].as_array().unwrap();
    assert!(!proposals.is_empty());
    assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_replay_is_byte_identical() {
    let harness = harness();
    let request = signed_text_request("job-0042", "idem-replay", "orders export");

    let first = harness.pipeline.handle(request.clone()).await;
    let second = harness.pipeline.handle(request).await;

    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert!(!first.replayed);
    assert!(second.replayed);
    assert_eq!(first.body, second.body);
    assert_eq!(
        second.headers().get(headers::IDEMPOTENT_REPLAY).map(String::as_str),
        Some("true")
    );
    assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recompute_after_retention_window() {
    let base = chrono::Utc::now().timestamp();
    let offset = Arc::new(AtomicI64::new(0));
    let clock_offset = offset.clone();
    let store = Arc::new(MemoryIdempotencyStore::with_clock(
        Duration::from_secs(3600),
        move || base + clock_offset.load(Ordering::SeqCst),
    ));
    let harness = harness_with(
        store,
        Arc::new(StaticWorkbookReader::new(fixture_workbook())),
        Duration::ZERO,
    );

    let request = signed_text_request("job-0042", "idem-ttl", "orders export");
    let first = harness.pipeline.handle(request.clone()).await;
    assert!(!first.replayed);

    // Within the hour the entry replays.
    offset.store(3599, Ordering::SeqCst);
    let replay = harness.pipeline.handle(request.clone()).await;
    assert!(replay.replayed);

    // Past the hour the job computes again.
    offset.store(3601, Ordering::SeqCst);
    let recomputed = harness.pipeline.handle(request).await;
    assert_eq!(recomputed.status, 200);
    assert!(!recomputed.replayed);
    assert_eq!(harness.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_duplicates_execute_once() {
    let config = BloomcastConfig::builder().secret(SECRET).build().expect("valid config");
    let harness = harness_with(
        Arc::new(MemoryIdempotencyStore::new(config.idempotency_ttl)),
        Arc::new(StaticWorkbookReader::new(fixture_workbook())),
        Duration::from_millis(100),
    );

    let request = signed_text_request("job-0042", "idem-race", "orders export");
    let first = tokio::spawn({
        let pipeline = harness.pipeline.clone();
        let request = request.clone();
        async move { pipeline.handle(request).await }
    });
    let second = tokio::spawn({
        let pipeline = harness.pipeline.clone();
        async move { pipeline.handle(request).await }
    });

    let first = first.await.unwrap();
    let second = second.await.unwrap();

    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert_eq!(first.body, second.body);
    assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
    assert!(first.replayed != second.replayed);
}

#[tokio::test]
async fn test_bad_signature_rejected_and_not_cached() {
    let harness = harness();
    let mut request = signed_text_request("job-0042", "idem-bad-sig", "orders export");
    request.signature = "v1=deadbeef".to_string();

    let outcome = harness.pipeline.handle(request).await;

    assert_eq!(outcome.status, 401);
    let value: serde_json::Value = serde_json::from_slice(&outcome.body).unwrap();
    assert_eq!(value["error"], "Authentication failed");
    assert!(harness.store.is_empty().await);
    assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stale_timestamp_indistinguishable_from_bad_signature() {
    let harness = harness();
    let text = "orders export";
    let ts = chrono::Utc::now().timestamp() - 3600;
    let signature =
        TaskyardSignature::new(SECRET).sign(ts, "job-0042", &payload_sha256_text(text));
    let request = JobRequest::new(
        "job-0042",
        ts,
        "idem-stale",
        signature,
        JobInput::Text(text.to_string()),
    );

    let stale = harness.pipeline.handle(request).await;

    let mut bad = signed_text_request("job-0042", "idem-bad", text);
    bad.signature = "v1=deadbeef".to_string();
    let bad = harness.pipeline.handle(bad).await;

    assert_eq!(stale.status, 401);
    assert_eq!(stale.body, bad.body);
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_missing_sheet_maps_to_422() {
    let workbook = Workbook::new().with_sheet(
        Sheet::new("History_Client", ["Date", "Product", "Qty"]).with_row([
            Cell::text("2024-03-04"),
            Cell::text("1001"),
            Cell::number(6.0),
        ]),
    );
    let config = BloomcastConfig::builder().secret(SECRET).build().expect("valid config");
    let harness = harness_with(
        Arc::new(MemoryIdempotencyStore::new(config.idempotency_ttl)),
        Arc::new(StaticWorkbookReader::new(workbook)),
        Duration::ZERO,
    );

    let request = signed_text_request("job-0042", "idem-missing-sheet", "orders export");
    let outcome = harness.pipeline.handle(request).await;

    assert_eq!(outcome.status, 422);
    let value: serde_json::Value = serde_json::from_slice(&outcome.body).unwrap();
    assert!(value["error"].as_str().unwrap().contains("History_Peers"));
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_url_input_downloads_and_verifies() {
    let server = MockServer::start().await;
    let body = b"raw spreadsheet bytes".to_vec();
    Mock::given(method("GET"))
        .and(path("/exports/wb.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let harness = harness();
    let ts = chrono::Utc::now().timestamp();
    let signature =
        TaskyardSignature::new(SECRET).sign(ts, "job-0042", &sha256_hex(&body));
    let request = JobRequest::new(
        "job-0042",
        ts,
        "idem-url",
        signature,
        JobInput::Url(UrlInput {
            url: format!("{}/exports/wb.xlsx", server.uri()),
            name: "wb.xlsx".to_string(),
            mime: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            size: body.len() as u64,
        }),
    );

    let outcome = harness.pipeline.handle(request).await;

    assert_eq!(outcome.status, 200);
    assert_eq!(harness.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_url_download_failure_maps_to_502() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exports/wb.xlsx"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let harness = harness();
    let ts = chrono::Utc::now().timestamp();
    let signature = TaskyardSignature::new(SECRET).sign(ts, "job-0042", &sha256_hex(b""));
    let request = JobRequest::new(
        "job-0042",
        ts,
        "idem-url-fail",
        signature,
        JobInput::Url(UrlInput {
            url: format!("{}/exports/wb.xlsx", server.uri()),
            name: "wb.xlsx".to_string(),
            mime: "application/octet-stream".to_string(),
            size: 0,
        }),
    );

    let outcome = harness.pipeline.handle(request).await;

    assert_eq!(outcome.status, 502);
    assert!(harness.store.is_empty().await);
}

#[tokio::test]
async fn test_distinct_keys_compute_independently() {
    let harness = harness();
    let first = signed_text_request("job-0042", "idem-a", "orders export");
    let second = signed_text_request("job-0042", "idem-b", "orders export");

    let first = harness.pipeline.handle(first).await;
    let second = harness.pipeline.handle(second).await;

    assert!(!first.replayed);
    assert!(!second.replayed);
    assert_eq!(harness.calls.load(Ordering::SeqCst), 2);
}
