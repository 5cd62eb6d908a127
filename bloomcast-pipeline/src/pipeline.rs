//! The job pipeline state machine
//!
//! A request moves through fixed stages: validate, materialize the input,
//! verify the signature, take the per-key lock, consult the idempotency
//! cache, then read, resolve, compute, respond, and store. Verification
//! always happens before the cache is consulted, so an unauthenticated
//! request can neither read nor write a cached response.

use crate::error::{PipelineError, Result};
use crate::fetch::InputFetcher;
use crate::receiver::{extract_request, RawRequest};
use crate::response::{error_outcome, success_body, JobOutcome, APPLICATION_JSON};
use async_trait::async_trait;
use bloomcast_core::{BloomcastConfig, JobInput, JobRequest};
use bloomcast_engine::{OrderProposal, OrderProposalEngine};
use bloomcast_idempotency::{CacheEntry, IdempotencyStore, KeyedLocks};
use bloomcast_schema::{ResolvedTables, SchemaResolver, Workbook};
use bloomcast_signing::{canonicalize, sha256_hex, TaskyardSignature};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decoder from raw input bytes to a [`Workbook`]
///
/// Spreadsheet file formats live outside this crate; the HTTP layer
/// injects whichever decoder it links in.
#[async_trait]
pub trait WorkbookReader: Send + Sync {
    /// Decode input bytes, using the declared filename as a format hint
    ///
    /// Undecodable bytes map to [`PipelineError::UnsupportedFormat`].
    async fn read(&self, name: Option<&str>, bytes: &[u8]) -> Result<Workbook>;
}

/// Compute stage of the pipeline
///
/// The production implementation is [`OrderProposalEngine`]; tests swap
/// in instrumented engines to observe execution counts.
#[async_trait]
pub trait ProposalEngine: Send + Sync {
    async fn propose(&self, tables: &ResolvedTables) -> Result<Vec<OrderProposal>>;
}

#[async_trait]
impl ProposalEngine for OrderProposalEngine {
    async fn propose(&self, tables: &ResolvedTables) -> Result<Vec<OrderProposal>> {
        Ok(OrderProposalEngine::propose(self, tables)?)
    }
}

/// Orchestrates one signed job from raw request to terminal response
pub struct JobPipeline {
    config: BloomcastConfig,
    signature: TaskyardSignature,
    store: Arc<dyn IdempotencyStore>,
    locks: KeyedLocks,
    fetcher: InputFetcher,
    reader: Arc<dyn WorkbookReader>,
    engine: Arc<dyn ProposalEngine>,
}

impl JobPipeline {
    /// Build a pipeline around a store and a workbook reader
    pub fn new(
        config: BloomcastConfig,
        store: Arc<dyn IdempotencyStore>,
        reader: Arc<dyn WorkbookReader>,
    ) -> Result<Self> {
        let signature = TaskyardSignature::new(config.secret.clone())
            .with_tolerance(config.timestamp_skew.as_secs());
        let fetcher = InputFetcher::new(&config)?;
        Ok(Self {
            config,
            signature,
            store,
            locks: KeyedLocks::new(),
            fetcher,
            reader,
            engine: Arc::new(OrderProposalEngine::new()),
        })
    }

    /// Replace the compute stage
    pub fn with_engine(mut self, engine: Arc<dyn ProposalEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Extract and handle a raw HTTP request
    pub async fn handle_raw(&self, raw: RawRequest) -> JobOutcome {
        match extract_request(raw) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                let err = PipelineError::from(err);
                warn!(error = %err, "request extraction failed");
                error_outcome(&err)
            }
        }
    }

    /// Handle a typed job request, mapping every failure to a terminal
    /// HTTP outcome
    pub async fn handle(&self, request: JobRequest) -> JobOutcome {
        let job_id = request.job_id.clone();
        match self.run(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(job_id = %job_id, error = %err, status = err.http_status(), "job failed");
                error_outcome(&err)
            }
        }
    }

    async fn run(&self, request: JobRequest) -> Result<JobOutcome> {
        request.validate()?;
        request.check_size(self.config.max_input_bytes)?;

        // Skew is checked before the input is materialized so a stale or
        // replayed-late request cannot trigger a download.
        let now = chrono::Utc::now().timestamp();
        if request.timestamp.abs_diff(now) > self.config.timestamp_skew.as_secs() {
            return Err(PipelineError::Auth(
                bloomcast_signing::SignatureError::ExpiredTimestamp,
            ));
        }

        // Materialize the payload bytes the signature covers: canonical
        // bytes for inline inputs, downloaded bytes for URL inputs.
        let (payload, input_name) = match &request.input {
            JobInput::Url(url) => {
                // The fetcher enforces the size cap on the downloaded bytes.
                let bytes = self.fetcher.fetch(url).await?;
                (bytes, Some(url.name.clone()))
            }
            JobInput::File { name, bytes } => (bytes.clone(), name.clone()),
            JobInput::Text(_) => (canonicalize(&request.input).into_owned(), None),
        };

        let digest = sha256_hex(&payload);
        self.signature
            .verify(request.timestamp, &request.job_id, &digest, &request.signature)
            .map_err(PipelineError::Auth)?;
        debug!(job_id = %request.job_id, "signature verified");

        // One in-flight execution per key; duplicates wait here and then
        // hit the cache.
        let _guard = self.locks.acquire(&request.idempotency_key).await;

        if let Some(entry) = self.store.lookup(&request.idempotency_key).await? {
            info!(
                job_id = %request.job_id,
                key = %request.idempotency_key,
                "serving cached response"
            );
            return Ok(JobOutcome {
                status: 200,
                body: entry.body,
                content_type: entry.content_type,
                replayed: true,
            });
        }

        let workbook = self.reader.read(input_name.as_deref(), &payload).await?;
        let tables = SchemaResolver::new().resolve(&workbook, &request.options)?;
        let proposals = self.engine.propose(&tables).await?;

        let body = success_body(
            &request.job_id,
            &request.completion_mode,
            &tables,
            &proposals,
        )?;
        self.store
            .store(
                &request.idempotency_key,
                CacheEntry::new(body.clone(), APPLICATION_JSON),
            )
            .await?;

        info!(
            job_id = %request.job_id,
            proposals = proposals.len(),
            skipped_rows = tables.diagnostics.total_skipped(),
            "job completed"
        );
        Ok(JobOutcome {
            status: 200,
            body,
            content_type: APPLICATION_JSON.to_string(),
            replayed: false,
        })
    }
}

impl std::fmt::Debug for JobPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A reader that hands back a pre-built workbook, ignoring the bytes
///
/// Useful when the HTTP layer has already decoded the input, and in
/// tests.
#[derive(Debug, Clone)]
pub struct StaticWorkbookReader {
    workbook: Workbook,
}

impl StaticWorkbookReader {
    pub fn new(workbook: Workbook) -> Self {
        Self { workbook }
    }
}

#[async_trait]
impl WorkbookReader for StaticWorkbookReader {
    async fn read(&self, _name: Option<&str>, _bytes: &[u8]) -> Result<Workbook> {
        Ok(self.workbook.clone())
    }
}
