//! Error types for proposal computation

use thiserror::Error;

/// Errors raised while computing order proposals
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A configured weight is outside its valid range
    #[error("Invalid weight {name}: {value}")]
    InvalidWeight { name: &'static str, value: String },

    /// The resolved tables contain no products at all
    #[error("No products found across history, stock, and recommendations")]
    NoProducts,
}
