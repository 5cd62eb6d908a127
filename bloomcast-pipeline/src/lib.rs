//! Job Pipeline Orchestration for BloomCast
//!
//! This crate wires the other BloomCast components into one request
//! handler: a [`JobPipeline`] takes a signed job request and walks it
//! through validation, input materialization, signature verification,
//! single-flight idempotency, schema resolution, and proposal
//! computation, then returns a terminal [`JobOutcome`] the HTTP layer can
//! send as-is.
//!
//! # Example
//!
//! ```rust,no_run
//! use bloomcast_core::BloomcastConfig;
//! use bloomcast_idempotency::MemoryIdempotencyStore;
//! use bloomcast_pipeline::{JobPipeline, RawRequest, StaticWorkbookReader};
//! use bloomcast_schema::Workbook;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), bloomcast_pipeline::PipelineError> {
//! let config = BloomcastConfig::builder().secret("replace_me").build()?;
//! let store = Arc::new(MemoryIdempotencyStore::new(config.idempotency_ttl));
//! let reader = Arc::new(StaticWorkbookReader::new(Workbook::new()));
//!
//! let pipeline = JobPipeline::new(config, store, reader)?;
//! let outcome = pipeline.handle_raw(RawRequest::default()).await;
//! assert_eq!(outcome.status, 422); // no headers supplied
//! # Ok(())
//! # }
//! ```

mod error;
mod fetch;
mod pipeline;
mod receiver;
mod response;

pub use error::{PipelineError, Result};
pub use fetch::InputFetcher;
pub use pipeline::{JobPipeline, ProposalEngine, StaticWorkbookReader, WorkbookReader};
pub use receiver::{extract_request, RawRequest};
pub use response::{error_outcome, success_body, JobOutcome, APPLICATION_JSON};
