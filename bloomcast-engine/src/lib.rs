//! Order Proposal Engine for BloomCast
//!
//! Consumes the resolved tables and the configured weights and produces a
//! deterministic order-quantity proposal per product:
//!
//! 1. Client and peer history are bucketed into ISO (year, week) pairs per
//!    product and averaged into a weekly baseline.
//! 2. Blended demand = client baseline + `PEER_WEIGHT` x peer baseline,
//!    plus `BUYER_BOOST` units when the buyer recommends the product.
//! 3. The order target is 10% above blended demand; the proposal is the
//!    target minus current stock, floored at zero and rounded up.
//!
//! Given identical tables and weights the output is identical, including
//! ordering (sorted by product id).

mod engine;
mod error;
mod proposal;

pub use engine::{EngineWeights, OrderProposalEngine, BUYER_BOOST_KEY, PEER_WEIGHT_KEY};
pub use error::EngineError;
pub use proposal::{OrderProposal, ProposalRationale};

/// Result type for proposal computation
pub type Result<T> = std::result::Result<T, EngineError>;
