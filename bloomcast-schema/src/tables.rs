//! Canonical tabular model produced by resolution

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the client's own sales history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub product: String,
    pub qty: f64,
}

/// One row of peer sales history, with the peer label when the export
/// carries one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerHistoryRow {
    pub date: NaiveDate,
    pub product: String,
    pub qty: f64,
    pub peer: Option<String>,
}

/// Current stock level (or 0/1 availability) for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub product: String,
    pub stock_level: f64,
}

/// A `Config` sheet value; numeric-looking values are coerced, everything
/// else passes through untouched for the compute stage to interpret
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Number(f64),
    Text(String),
}

impl ConfigValue {
    /// Numeric view of the value, parsing text when possible
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(value) => Some(*value),
            ConfigValue::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Textual view of the value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(text) => Some(text),
            ConfigValue::Number(_) => None,
        }
    }
}

/// Row-level skip counts and the sheet-name mapping that resolution chose
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveDiagnostics {
    /// Rows dropped from `History_Client` (bad date/qty or empty product)
    pub skipped_history_client: usize,
    /// Rows dropped from `History_Peers`
    pub skipped_history_peers: usize,
    /// Rows dropped from `Current_Stock`
    pub skipped_stock: usize,
    /// Rows dropped from `Buyer_Recs`
    pub skipped_buyer_recs: usize,
    /// Logical sheet name to concrete workbook sheet name
    pub resolved_sheets: BTreeMap<String, String>,
}

impl ResolveDiagnostics {
    /// Total rows dropped across all tables
    pub fn total_skipped(&self) -> usize {
        self.skipped_history_client
            + self.skipped_history_peers
            + self.skipped_stock
            + self.skipped_buyer_recs
    }
}

/// The resolved tables a workbook maps onto
///
/// Invariant: every row carries a non-empty product identifier and fully
/// parsed date/number values; anything else was skipped and counted in
/// the diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolvedTables {
    pub history_client: Vec<HistoryRow>,
    pub history_peers: Vec<PeerHistoryRow>,
    pub current_stock: Vec<StockRow>,
    /// Distinct buyer-recommended products, first-seen order
    pub buyer_recs: Vec<String>,
    /// Flat settings map from the `Config` sheet
    pub config: BTreeMap<String, ConfigValue>,
    pub diagnostics: ResolveDiagnostics,
}

impl ResolvedTables {
    /// Numeric config setting with a default
    pub fn config_f64(&self, key: &str, default: f64) -> f64 {
        self.config
            .get(key)
            .and_then(ConfigValue::as_f64)
            .unwrap_or(default)
    }
}
