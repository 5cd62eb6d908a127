//! Schema resolver
//!
//! Maps an arbitrary workbook onto [`ResolvedTables`] by resolving each
//! logical sheet and each required column through the same priority chain:
//! explicit override, canonical name, aliases in order, then a substring
//! match. A substring match that hits more than one distinct candidate is
//! an [`ResolutionError::AmbiguousMatch`]; no candidate at all is a
//! [`ResolutionError::MissingSheet`] or [`ResolutionError::MissingColumn`]
//! naming exactly what was not found.

use crate::aliases::{norm, Field, LogicalSheet, ALIAS_TABLE};
use crate::coerce::{normalize_product, parse_date, parse_number};
use crate::error::ResolutionError;
use crate::tables::{
    ConfigValue, HistoryRow, PeerHistoryRow, ResolveDiagnostics, ResolvedTables, StockRow,
};
use crate::workbook::{Cell, Sheet, Workbook};
use crate::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Scope marker used in ambiguity errors raised while resolving a sheet
/// name (as opposed to a column within a sheet)
const WORKBOOK_SCOPE: &str = "workbook";

/// Deterministic workbook-to-tables resolver
#[derive(Debug, Clone, Default)]
pub struct SchemaResolver;

impl SchemaResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve a workbook into the canonical tables
    ///
    /// `overrides` are the per-job options; they take precedence over
    /// override values carried in the workbook's own `Config` sheet.
    pub fn resolve(
        &self,
        workbook: &Workbook,
        overrides: &HashMap<String, String>,
    ) -> Result<ResolvedTables> {
        let mut diagnostics = ResolveDiagnostics::default();

        // The Config sheet is resolved first because it may carry override
        // keys for the other four. Job options are the only overrides
        // available at this point.
        let config = match self.resolve_sheet_name(
            workbook,
            LogicalSheet::Config,
            |key| overrides.get(key).map(String::as_str),
        ) {
            Ok(name) => {
                diagnostics
                    .resolved_sheets
                    .insert(LogicalSheet::Config.canonical().to_string(), name.clone());
                let sheet = workbook.sheet(&name).expect("resolved name exists");
                self.parse_config_sheet(sheet, overrides)?
            }
            // A workbook without a Config sheet is legal; overrides can
            // still arrive via job options.
            Err(ResolutionError::MissingSheet(_)) => BTreeMap::new(),
            Err(err) => return Err(err),
        };

        // Effective override lookup: job options win over Config values.
        let lookup = |key: &str| -> Option<&str> {
            overrides
                .get(key)
                .map(String::as_str)
                .or_else(|| config.get(key).and_then(ConfigValue::as_str))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let mut resolved: HashMap<LogicalSheet, &Sheet> = HashMap::new();
        for logical in [
            LogicalSheet::HistoryClient,
            LogicalSheet::HistoryPeers,
            LogicalSheet::CurrentStock,
            LogicalSheet::BuyerRecs,
        ] {
            let name = self.resolve_sheet_name(workbook, logical, lookup)?;
            debug!(logical = logical.canonical(), sheet = %name, "resolved sheet");
            diagnostics
                .resolved_sheets
                .insert(logical.canonical().to_string(), name.clone());
            resolved.insert(logical, workbook.sheet(&name).expect("resolved name exists"));
        }

        let history_client = self.extract_history(
            resolved[&LogicalSheet::HistoryClient],
            LogicalSheet::HistoryClient,
            lookup,
            &mut diagnostics.skipped_history_client,
        )?;
        let history_peers = self.extract_peer_history(
            resolved[&LogicalSheet::HistoryPeers],
            lookup,
            &mut diagnostics.skipped_history_peers,
        )?;
        let current_stock = self.extract_stock(
            resolved[&LogicalSheet::CurrentStock],
            lookup,
            &mut diagnostics.skipped_stock,
        )?;
        let buyer_recs = self.extract_buyer_recs(
            resolved[&LogicalSheet::BuyerRecs],
            lookup,
            &mut diagnostics.skipped_buyer_recs,
        )?;

        if diagnostics.total_skipped() > 0 {
            warn!(
                skipped = diagnostics.total_skipped(),
                "dropped rows during schema resolution"
            );
        }

        Ok(ResolvedTables {
            history_client,
            history_peers,
            current_stock,
            buyer_recs,
            config,
            diagnostics,
        })
    }

    /// Resolve the concrete workbook name of a logical sheet
    fn resolve_sheet_name<'a>(
        &self,
        workbook: &Workbook,
        logical: LogicalSheet,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<String> {
        let names: Vec<&str> = workbook.sheet_names().collect();

        // Overrides are authoritative: when present they never fall back.
        if let Some(wanted) = lookup(logical.override_key()) {
            let wanted_norm = norm(wanted);
            return names
                .iter()
                .find(|n| norm(n) == wanted_norm)
                .map(|n| n.to_string())
                .ok_or_else(|| ResolutionError::MissingSheet(logical.canonical().to_string()));
        }

        match_name(&names, ALIAS_TABLE.sheet_names(logical)).map_err(|candidates| {
            if candidates.is_empty() {
                ResolutionError::MissingSheet(logical.canonical().to_string())
            } else {
                ResolutionError::AmbiguousMatch {
                    sheet: WORKBOOK_SCOPE.to_string(),
                    field: logical.canonical().to_string(),
                    candidates,
                }
            }
        })
    }

    /// Resolve a required column within an already-resolved sheet
    fn resolve_column<'a>(
        &self,
        sheet: &Sheet,
        logical: LogicalSheet,
        field: Field,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<usize> {
        self.resolve_column_opt(sheet, logical, field, lookup)?
            .ok_or_else(|| ResolutionError::MissingColumn {
                sheet: logical.canonical().to_string(),
                field: field.canonical().to_string(),
            })
    }

    /// Resolve an optional column; `Ok(None)` when nothing matches
    fn resolve_column_opt<'a>(
        &self,
        sheet: &Sheet,
        logical: LogicalSheet,
        field: Field,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<Option<usize>> {
        let headers: Vec<&str> = sheet.headers().iter().map(String::as_str).collect();

        if let Some(wanted) = lookup(&logical.column_override_key(field)) {
            let wanted_norm = norm(wanted);
            return Ok(headers.iter().position(|h| norm(h) == wanted_norm));
        }

        match match_name(&headers, ALIAS_TABLE.field_names(field)) {
            Ok(name) => Ok(sheet.column_index(&name)),
            Err(candidates) if candidates.is_empty() => Ok(None),
            Err(candidates) => Err(ResolutionError::AmbiguousMatch {
                sheet: logical.canonical().to_string(),
                field: field.canonical().to_string(),
                candidates,
            }),
        }
    }

    /// Parse the `Config` sheet into a flat settings map
    fn parse_config_sheet<'a>(
        &self,
        sheet: &Sheet,
        overrides: &'a HashMap<String, String>,
    ) -> Result<BTreeMap<String, ConfigValue>> {
        let lookup = |key: &str| overrides.get(key).map(String::as_str);
        let setting_col =
            self.resolve_column(sheet, LogicalSheet::Config, Field::Setting, lookup)?;
        let value_col = self.resolve_column(sheet, LogicalSheet::Config, Field::Value, lookup)?;

        let mut config = BTreeMap::new();
        for row in 0..sheet.row_count() {
            let key = match sheet.cell(row, setting_col) {
                Cell::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
                _ => continue,
            };
            let value = match sheet.cell(row, value_col) {
                Cell::Number(n) => ConfigValue::Number(*n),
                Cell::Bool(b) => ConfigValue::Number(if *b { 1.0 } else { 0.0 }),
                Cell::Text(text) => {
                    let text = text.trim();
                    // Numeric-looking values coerce; everything else passes
                    // through untouched.
                    match text.parse::<f64>() {
                        Ok(n) => ConfigValue::Number(n),
                        Err(_) => ConfigValue::Text(text.to_string()),
                    }
                }
                Cell::Empty => continue,
            };
            config.insert(key, value);
        }
        Ok(config)
    }

    /// Extract (date, product, qty) rows from a history sheet
    fn extract_history<'a>(
        &self,
        sheet: &Sheet,
        logical: LogicalSheet,
        lookup: impl Fn(&str) -> Option<&'a str> + Copy,
        skipped: &mut usize,
    ) -> Result<Vec<HistoryRow>> {
        let date_col = self.resolve_column(sheet, logical, Field::Date, lookup)?;
        let product_col = self.resolve_column(sheet, logical, Field::Product, lookup)?;
        let qty_col = self.resolve_column(sheet, logical, Field::Qty, lookup)?;

        let mut rows = Vec::with_capacity(sheet.row_count());
        for row in 0..sheet.row_count() {
            let date = parse_date(sheet.cell(row, date_col));
            let product = normalize_product(sheet.cell(row, product_col));
            let qty = parse_number(sheet.cell(row, qty_col));
            match (date, qty) {
                (Some(date), Some(qty)) if !product.is_empty() => {
                    rows.push(HistoryRow { date, product, qty });
                }
                _ => *skipped += 1,
            }
        }
        Ok(rows)
    }

    /// Extract peer history rows, keeping the peer label when present
    fn extract_peer_history<'a>(
        &self,
        sheet: &Sheet,
        lookup: impl Fn(&str) -> Option<&'a str> + Copy,
        skipped: &mut usize,
    ) -> Result<Vec<PeerHistoryRow>> {
        let logical = LogicalSheet::HistoryPeers;
        let date_col = self.resolve_column(sheet, logical, Field::Date, lookup)?;
        let product_col = self.resolve_column(sheet, logical, Field::Product, lookup)?;
        let qty_col = self.resolve_column(sheet, logical, Field::Qty, lookup)?;
        let peer_col = self.resolve_column_opt(sheet, logical, Field::Peer, lookup)?;

        let mut rows = Vec::with_capacity(sheet.row_count());
        for row in 0..sheet.row_count() {
            let date = parse_date(sheet.cell(row, date_col));
            let product = normalize_product(sheet.cell(row, product_col));
            let qty = parse_number(sheet.cell(row, qty_col));
            let peer = peer_col.and_then(|col| match sheet.cell(row, col) {
                Cell::Text(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
                Cell::Number(n) => Some(format!("{n}")),
                _ => None,
            });
            match (date, qty) {
                (Some(date), Some(qty)) if !product.is_empty() => {
                    rows.push(PeerHistoryRow {
                        date,
                        product,
                        qty,
                        peer,
                    });
                }
                _ => *skipped += 1,
            }
        }
        Ok(rows)
    }

    /// Extract (product, stock_level) rows
    fn extract_stock<'a>(
        &self,
        sheet: &Sheet,
        lookup: impl Fn(&str) -> Option<&'a str> + Copy,
        skipped: &mut usize,
    ) -> Result<Vec<StockRow>> {
        let logical = LogicalSheet::CurrentStock;
        let product_col = self.resolve_column(sheet, logical, Field::Product, lookup)?;
        let stock_col = self.resolve_column(sheet, logical, Field::StockLevel, lookup)?;

        let mut rows = Vec::with_capacity(sheet.row_count());
        for row in 0..sheet.row_count() {
            let product = normalize_product(sheet.cell(row, product_col));
            let stock_level = parse_number(sheet.cell(row, stock_col));
            match stock_level {
                Some(stock_level) if !product.is_empty() => {
                    rows.push(StockRow {
                        product,
                        stock_level,
                    });
                }
                _ => *skipped += 1,
            }
        }
        Ok(rows)
    }

    /// Extract the distinct buyer-recommended products, first-seen order
    fn extract_buyer_recs<'a>(
        &self,
        sheet: &Sheet,
        lookup: impl Fn(&str) -> Option<&'a str> + Copy,
        skipped: &mut usize,
    ) -> Result<Vec<String>> {
        let product_col =
            self.resolve_column(sheet, LogicalSheet::BuyerRecs, Field::Product, lookup)?;

        let mut seen = HashSet::new();
        let mut products = Vec::new();
        for row in 0..sheet.row_count() {
            let product = normalize_product(sheet.cell(row, product_col));
            if product.is_empty() {
                *skipped += 1;
                continue;
            }
            if seen.insert(product.clone()) {
                products.push(product);
            }
        }
        Ok(products)
    }
}

/// Match one wanted name against the actual names
///
/// Exact (normalized) matches are tried against every wanted spelling in
/// priority order; only then is a substring pass run over all spellings at
/// once. `Err` carries the distinct substring candidates: empty means no
/// match, more than one means ambiguity.
fn match_name(
    actual: &[&str],
    wanted_normalized: &[String],
) -> std::result::Result<String, Vec<String>> {
    let actual_norm: Vec<String> = actual.iter().map(|n| norm(n)).collect();

    for wanted in wanted_normalized {
        if let Some(pos) = actual_norm.iter().position(|n| n == wanted) {
            return Ok(actual[pos].to_string());
        }
    }

    let mut candidates: Vec<String> = Vec::new();
    for (pos, name) in actual_norm.iter().enumerate() {
        if wanted_normalized.iter().any(|w| name.contains(w.as_str()))
            && !candidates.iter().any(|c| c == actual[pos])
        {
            candidates.push(actual[pos].to_string());
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        _ => Err(candidates),
    }
}
