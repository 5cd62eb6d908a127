//! Schema Resolution for BloomCast Workbooks
//!
//! Client workbooks arrive in two broad shapes: the recommended template
//! (`Config`, `History_Client`, `History_Peers`, `Current_Stock`,
//! `Buyer_Recs`) and raw ERP exports with localized sheet and column names
//! (`Klanthistorie`, `Orderdatum`, `Artikel`, ...). This crate maps either
//! shape onto the canonical tabular model the proposal engine consumes.
//!
//! Resolution is deterministic and refuses to guess: for every sheet and
//! column the priority is explicit override, then canonical name, then the
//! alias list in order, then a substring match — and a substring match
//! that hits more than one candidate is an error, never a silent pick.
//! Failures name the exact sheet or field so the caller can add a
//! `Config` override rather than decode a generic parse error.
//!
//! # Example
//!
//! ```rust
//! use bloomcast_schema::{Cell, SchemaResolver, Sheet, Workbook};
//! use std::collections::HashMap;
//!
//! let mut workbook = Workbook::new();
//! workbook.push_sheet(
//!     Sheet::new("klanthistorie", ["Datum", "Artikel", "Aantal"])
//!         .with_row([Cell::text("2024-03-04"), Cell::text("1001"), Cell::number(6.0)]),
//! );
//! workbook.push_sheet(
//!     Sheet::new("Historie andere klanten", ["Datum", "Artikel", "Aantal", "Klant"])
//!         .with_row([
//!             Cell::text("2024-03-05"),
//!             Cell::text("1001"),
//!             Cell::number(9.0),
//!             Cell::text("Peer BV"),
//!         ]),
//! );
//! workbook.push_sheet(
//!     Sheet::new("Voorraad", ["Artikel", "Voorraad"])
//!         .with_row([Cell::text("1001"), Cell::number(3.0)]),
//! );
//! workbook.push_sheet(
//!     Sheet::new("Aanbevolen assortiment", ["Artikel"]).with_row([Cell::text("1001")]),
//! );
//!
//! let tables = SchemaResolver::new()
//!     .resolve(&workbook, &HashMap::new())
//!     .unwrap();
//! assert_eq!(tables.history_client.len(), 1);
//! assert_eq!(tables.buyer_recs, vec!["1001".to_string()]);
//! ```

mod aliases;
mod coerce;
mod error;
mod resolver;
mod tables;
mod workbook;

pub use aliases::{Field, LogicalSheet};
pub use coerce::{normalize_product, parse_date, parse_number};
pub use error::ResolutionError;
pub use resolver::SchemaResolver;
pub use tables::{
    ConfigValue, HistoryRow, PeerHistoryRow, ResolveDiagnostics, ResolvedTables, StockRow,
};
pub use workbook::{Cell, Sheet, Workbook};

/// Result type for schema resolution
pub type Result<T> = std::result::Result<T, ResolutionError>;
