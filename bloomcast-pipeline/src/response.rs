//! Response body construction
//!
//! The success body is serialized to bytes exactly once; the same bytes
//! are sent and cached, so a replay is byte-identical by construction.

use crate::error::{PipelineError, Result};
use bloomcast_core::headers;
use bloomcast_engine::OrderProposal;
use bloomcast_schema::{ResolveDiagnostics, ResolvedTables};
use serde::Serialize;
use std::collections::HashMap;

/// Content type of every pipeline response
pub const APPLICATION_JSON: &str = "application/json";

/// The outcome of one handled request, ready for the HTTP layer
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// HTTP status code
    pub status: u16,
    /// Exact response body bytes
    pub body: Vec<u8>,
    /// Content type of the body
    pub content_type: String,
    /// Whether this outcome was served from the idempotency cache
    pub replayed: bool,
}

impl JobOutcome {
    /// Response headers, including the replay marker when applicable
    pub fn headers(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("Content-Type".to_string(), self.content_type.clone());
        if self.replayed {
            map.insert(headers::IDEMPOTENT_REPLAY.to_string(), "true".to_string());
        }
        map
    }
}

/// Success body for a completed job
#[derive(Debug, Serialize)]
struct JobResponse<'a> {
    result_status: &'a str,
    job_id: &'a str,
    summary: String,
    proposals: &'a [OrderProposal],
    diagnostics: &'a ResolveDiagnostics,
}

/// Serialize the success body for a computed job
pub fn success_body(
    job_id: &str,
    completion_mode: &str,
    tables: &ResolvedTables,
    proposals: &[OrderProposal],
) -> Result<Vec<u8>> {
    let result_status = if completion_mode == "completed" {
        "completed"
    } else {
        "review"
    };
    let response = JobResponse {
        result_status,
        job_id,
        summary: format!(
            "BloomCast generated an order proposal for {} products.",
            proposals.len()
        ),
        proposals,
        diagnostics: &tables.diagnostics,
    };
    serde_json::to_vec(&response).map_err(|e| PipelineError::Internal(e.to_string()))
}

/// Serialize an error body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a pipeline error to its terminal outcome
pub fn error_outcome(err: &PipelineError) -> JobOutcome {
    let body = serde_json::to_vec(&ErrorResponse {
        error: err.to_string(),
    })
    .unwrap_or_else(|_| b"{\"error\":\"internal\"}".to_vec());
    JobOutcome {
        status: err.http_status(),
        body,
        content_type: APPLICATION_JSON.to_string(),
        replayed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloomcast_signing::SignatureError;

    #[test]
    fn test_success_body_review_status() {
        let tables = ResolvedTables::default();
        let body = success_body("job-1", "review", &tables, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["result_status"], "review");
        assert_eq!(value["job_id"], "job-1");
    }

    #[test]
    fn test_success_body_completed_status() {
        let tables = ResolvedTables::default();
        let body = success_body("job-1", "completed", &tables, &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["result_status"], "completed");
    }

    #[test]
    fn test_error_outcome_auth_is_opaque() {
        let outcome = error_outcome(&PipelineError::Auth(SignatureError::ExpiredTimestamp));
        assert_eq!(outcome.status, 401);
        let value: serde_json::Value = serde_json::from_slice(&outcome.body).unwrap();
        assert_eq!(value["error"], "Authentication failed");
    }

    #[test]
    fn test_replay_header_present_only_on_replay() {
        let outcome = JobOutcome {
            status: 200,
            body: vec![],
            content_type: APPLICATION_JSON.to_string(),
            replayed: true,
        };
        assert_eq!(
            outcome.headers().get(headers::IDEMPOTENT_REPLAY).map(String::as_str),
            Some("true")
        );

        let fresh = JobOutcome {
            replayed: false,
            ..outcome
        };
        assert!(!fresh.headers().contains_key(headers::IDEMPOTENT_REPLAY));
    }
}
