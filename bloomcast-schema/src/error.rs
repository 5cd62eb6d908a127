//! Error types for schema resolution
//!
//! Resolution failures are recoverable by the caller (add a `Config`
//! override), so each variant names the exact sheet or field that failed.

use thiserror::Error;

/// Errors raised while mapping a workbook onto the canonical model
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No sheet matched after exhausting override, canonical name, and
    /// aliases
    #[error("Missing sheet: {0}")]
    MissingSheet(String),

    /// A required column could not be found within a resolved sheet
    #[error("Missing column '{field}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, field: String },

    /// More than one candidate matched; resolution refuses to guess
    #[error("Ambiguous match for '{field}' in '{sheet}': candidates {candidates:?}")]
    AmbiguousMatch {
        sheet: String,
        field: String,
        candidates: Vec<String>,
    },
}
