//! Proposal output model

use serde::{Deserialize, Serialize};

/// Why a proposal came out the way it did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRationale {
    /// Mean weekly quantity the client sold, across observed ISO weeks
    pub client_weekly_avg: f64,
    /// Mean weekly quantity peers sold
    pub peer_weekly_avg: f64,
    /// Current stock level (or 0/1 availability)
    pub stock_level: f64,
    /// Whether the buyer recommends this product
    pub buyer_recommended: bool,
}

/// One order-quantity proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProposal {
    /// Normalized product identifier
    pub product: String,
    /// Units to order this cycle
    pub recommended_qty: u64,
    /// Inputs behind the number
    pub rationale: ProposalRationale,
}
