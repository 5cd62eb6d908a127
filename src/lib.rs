//! BloomCast - Taskyard agent service core
//!
//! This library wires together the signed-webhook job protocol, the
//! idempotent-replay cache, the spreadsheet schema resolver, and the
//! order-proposal engine into a single pipeline.

// Re-export the shared job model and configuration
pub use bloomcast_core::*;

// Re-export the member crates under their own namespaces
pub use bloomcast_engine;
pub use bloomcast_idempotency;
pub use bloomcast_pipeline;
pub use bloomcast_schema;
pub use bloomcast_signing;

// Prelude for common imports
pub mod prelude {
    pub use bloomcast_core::{BloomcastConfig, JobInput, JobRequest, headers};
    pub use bloomcast_engine::{OrderProposal, OrderProposalEngine};
    pub use bloomcast_idempotency::{IdempotencyStore, MemoryIdempotencyStore};
    pub use bloomcast_pipeline::{JobOutcome, JobPipeline, WorkbookReader};
    pub use bloomcast_schema::{ResolvedTables, SchemaResolver, Workbook};
    pub use bloomcast_signing::{TaskyardSignature, canonicalize, payload_sha256};
}
