//! Proposal computation

use crate::proposal::{OrderProposal, ProposalRationale};
use crate::{EngineError, Result};
use bloomcast_schema::ResolvedTables;
use chrono::Datelike;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Config key for the peer-history weight
pub const PEER_WEIGHT_KEY: &str = "PEER_WEIGHT";

/// Config key for the buyer-recommendation boost
pub const BUYER_BOOST_KEY: &str = "BUYER_BOOST";

/// Demand uplift applied on top of the blended weekly baseline
const TARGET_UPLIFT: f64 = 1.10;

/// Weighting knobs that feed the ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineWeights {
    /// Contribution of the peer weekly baseline, 0.0..=1.0
    pub peer_weight: f64,
    /// Flat unit boost for buyer-recommended products, >= 0
    pub buyer_boost: f64,
}

impl Default for EngineWeights {
    fn default() -> Self {
        Self {
            peer_weight: 0.2,
            buyer_boost: 10.0,
        }
    }
}

impl EngineWeights {
    /// Read the weights from a resolved config map, falling back to the
    /// defaults for absent keys
    pub fn from_tables(tables: &ResolvedTables) -> Result<Self> {
        let defaults = Self::default();
        let weights = Self {
            peer_weight: tables.config_f64(PEER_WEIGHT_KEY, defaults.peer_weight),
            buyer_boost: tables.config_f64(BUYER_BOOST_KEY, defaults.buyer_boost),
        };
        weights.validate()?;
        Ok(weights)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.peer_weight) || !self.peer_weight.is_finite() {
            return Err(EngineError::InvalidWeight {
                name: PEER_WEIGHT_KEY,
                value: self.peer_weight.to_string(),
            });
        }
        if self.buyer_boost < 0.0 || !self.buyer_boost.is_finite() {
            return Err(EngineError::InvalidWeight {
                name: BUYER_BOOST_KEY,
                value: self.buyer_boost.to_string(),
            });
        }
        Ok(())
    }
}

/// Deterministic order-quantity proposal engine
#[derive(Debug, Clone, Default)]
pub struct OrderProposalEngine;

impl OrderProposalEngine {
    /// Create an engine
    pub fn new() -> Self {
        Self
    }

    /// Compute one proposal per distinct product seen across history,
    /// stock, and recommendations, sorted by product id
    ///
    /// Weights are read from the resolved config (`PEER_WEIGHT`,
    /// `BUYER_BOOST`) with the documented defaults.
    pub fn propose(&self, tables: &ResolvedTables) -> Result<Vec<OrderProposal>> {
        let weights = EngineWeights::from_tables(tables)?;
        self.propose_with_weights(tables, weights)
    }

    /// Compute proposals with explicit weights
    pub fn propose_with_weights(
        &self,
        tables: &ResolvedTables,
        weights: EngineWeights,
    ) -> Result<Vec<OrderProposal>> {
        let client_avg = weekly_average(
            tables
                .history_client
                .iter()
                .map(|r| (r.product.as_str(), r.date, r.qty)),
        );
        let peer_avg = weekly_average(
            tables
                .history_peers
                .iter()
                .map(|r| (r.product.as_str(), r.date, r.qty)),
        );

        let stock: HashMap<&str, f64> = tables
            .current_stock
            .iter()
            .map(|r| (r.product.as_str(), r.stock_level))
            .collect();
        let recommended: HashSet<&str> =
            tables.buyer_recs.iter().map(String::as_str).collect();

        // One proposal per distinct product, in sorted order.
        let products: BTreeSet<&str> = tables
            .history_client
            .iter()
            .map(|r| r.product.as_str())
            .chain(tables.history_peers.iter().map(|r| r.product.as_str()))
            .chain(tables.current_stock.iter().map(|r| r.product.as_str()))
            .chain(tables.buyer_recs.iter().map(String::as_str))
            .collect();

        if products.is_empty() {
            return Err(EngineError::NoProducts);
        }

        let proposals = products
            .into_iter()
            .map(|product| {
                let client_weekly_avg = client_avg.get(product).copied().unwrap_or(0.0);
                let peer_weekly_avg = peer_avg.get(product).copied().unwrap_or(0.0);
                let stock_level = stock.get(product).copied().unwrap_or(0.0);
                let buyer_recommended = recommended.contains(product);

                let mut blended = client_weekly_avg + weights.peer_weight * peer_weekly_avg;
                if buyer_recommended {
                    blended += weights.buyer_boost;
                }
                let target = blended * TARGET_UPLIFT;
                let recommended_qty = (target - stock_level).max(0.0).ceil() as u64;

                OrderProposal {
                    product: product.to_string(),
                    recommended_qty,
                    rationale: ProposalRationale {
                        client_weekly_avg,
                        peer_weekly_avg,
                        stock_level,
                        buyer_recommended,
                    },
                }
            })
            .collect::<Vec<_>>();

        debug!(products = proposals.len(), "computed order proposals");
        Ok(proposals)
    }
}

/// Mean weekly quantity per product, bucketing rows into ISO (year, week)
/// pairs first so multiple orders in one week count as one observation
fn weekly_average<'a>(
    rows: impl Iterator<Item = (&'a str, chrono::NaiveDate, f64)>,
) -> HashMap<&'a str, f64> {
    // product -> (iso year, iso week) -> summed qty
    let mut buckets: HashMap<&str, BTreeMap<(i32, u32), f64>> = HashMap::new();
    for (product, date, qty) in rows {
        let iso = date.iso_week();
        *buckets
            .entry(product)
            .or_default()
            .entry((iso.year(), iso.week()))
            .or_insert(0.0) += qty;
    }

    buckets
        .into_iter()
        .map(|(product, weeks)| {
            let total: f64 = weeks.values().sum();
            (product, total / weeks.len() as f64)
        })
        .collect()
}
