//! Canonical names, override keys, and alias lists
//!
//! The alias table is a static ordered mapping from canonical sheet/field
//! name to the header spellings seen in the wild (template English plus
//! Dutch ERP exports). It is normalized once at startup; resolution is a
//! pure function over it.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The five logical sheets of a BloomCast workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalSheet {
    /// Flat settings map, also the source of resolution overrides
    Config,
    /// The client's own sales history
    HistoryClient,
    /// Sales history of comparable peers
    HistoryPeers,
    /// Current stock or availability per product
    CurrentStock,
    /// Buyer-recommended assortment
    BuyerRecs,
}

impl LogicalSheet {
    /// All logical sheets, in resolution order
    pub const ALL: [LogicalSheet; 5] = [
        LogicalSheet::Config,
        LogicalSheet::HistoryClient,
        LogicalSheet::HistoryPeers,
        LogicalSheet::CurrentStock,
        LogicalSheet::BuyerRecs,
    ];

    /// Canonical (template) sheet name
    pub fn canonical(&self) -> &'static str {
        match self {
            LogicalSheet::Config => "Config",
            LogicalSheet::HistoryClient => "History_Client",
            LogicalSheet::HistoryPeers => "History_Peers",
            LogicalSheet::CurrentStock => "Current_Stock",
            LogicalSheet::BuyerRecs => "Buyer_Recs",
        }
    }

    /// Override key consulted in job options and the `Config` sheet
    pub fn override_key(&self) -> &'static str {
        match self {
            LogicalSheet::Config => "CONFIG_SHEET",
            LogicalSheet::HistoryClient => "HISTORY_CLIENT_SHEET",
            LogicalSheet::HistoryPeers => "HISTORY_PEERS_SHEET",
            LogicalSheet::CurrentStock => "CURRENT_STOCK_SHEET",
            LogicalSheet::BuyerRecs => "BUYER_RECS_SHEET",
        }
    }

    /// Recognized sheet-name aliases, in priority order
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            LogicalSheet::Config => &["Configuratie", "Instellingen", "Settings"],
            LogicalSheet::HistoryClient => &[
                "Klanthistorie",
                "Klant historie",
                "Client history",
                "Historie klant",
            ],
            LogicalSheet::HistoryPeers => &[
                "Historie andere klanten",
                "Peer history",
                "Peers",
                "Andere klanten",
            ],
            LogicalSheet::CurrentStock => &[
                "Voorraad",
                "Stock",
                "Basis assortiment",
                "Basisassortiment",
                "Assortiment",
            ],
            LogicalSheet::BuyerRecs => &[
                "Aanbevolen assortiment",
                "Buyer",
                "Recommendations",
            ],
        }
    }

    /// Override-key prefix for this sheet's column overrides
    fn column_override_prefix(&self) -> &'static str {
        match self {
            LogicalSheet::Config => "CONFIG",
            LogicalSheet::HistoryClient => "HISTORY_CLIENT",
            LogicalSheet::HistoryPeers => "HISTORY_PEERS",
            LogicalSheet::CurrentStock => "CURRENT_STOCK",
            LogicalSheet::BuyerRecs => "BUYER_RECS",
        }
    }

    /// Override key for one of this sheet's columns, e.g.
    /// `HISTORY_CLIENT_DATE_COL`
    pub fn column_override_key(&self, field: Field) -> String {
        format!(
            "{}_{}_COL",
            self.column_override_prefix(),
            field.override_suffix()
        )
    }
}

/// Canonical field (column) names across the logical sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Order or sale date
    Date,
    /// Product identifier
    Product,
    /// Quantity sold
    Qty,
    /// Peer customer label (peers history only)
    Peer,
    /// Stock quantity or availability
    StockLevel,
    /// Config setting name
    Setting,
    /// Config setting value
    Value,
}

impl Field {
    /// Canonical (template) column header
    pub fn canonical(&self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Product => "Product",
            Field::Qty => "Qty",
            Field::Peer => "Peer",
            Field::StockLevel => "StockLevel",
            Field::Setting => "Setting",
            Field::Value => "Value",
        }
    }

    /// Suffix used when building column override keys
    fn override_suffix(&self) -> &'static str {
        match self {
            Field::Date => "DATE",
            Field::Product => "PRODUCT",
            Field::Qty => "QTY",
            Field::Peer => "PEER",
            Field::StockLevel => "STOCK",
            Field::Setting => "SETTING",
            Field::Value => "VALUE",
        }
    }

    /// Recognized header aliases, in priority order
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Date => &[
                "Orderdatum",
                "Verzenddatum",
                "Datum",
                "Verkoopdatum",
                "DateTime",
            ],
            Field::Product => &[
                "Artikel",
                "Artikel nr",
                "Artikelnr",
                "Artikelnummer",
                "Omschrijving",
            ],
            Field::Qty => &["Aantal", "Quantity", "Verkoopaantal", "Aantal stuks"],
            Field::Peer => &[
                "Klant",
                "Klantnaam",
                "Klant nr",
                "Klantnr",
                "Debiteur",
                "Debiteurnr",
                "Customer",
                "CustomerName",
                "Customer No",
                "CustomerNo",
                "Account",
            ],
            Field::StockLevel => &[
                "Stock",
                "Voorraad",
                "Voorraadniveau",
                "Voorraad aanwezig",
                "Beschikbare voorraad",
                "Available stock",
                "On hand",
                "Leverbaar",
                "Available",
                "Beschikbaar",
            ],
            Field::Setting => &["Instelling", "Key"],
            Field::Value => &["Waarde"],
        }
    }
}

/// Normalized form used for all name comparisons
pub(crate) fn norm(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Alias table with names pre-normalized, built once at startup
pub(crate) struct AliasTable {
    sheets: HashMap<LogicalSheet, Vec<String>>,
    fields: HashMap<Field, Vec<String>>,
}

impl AliasTable {
    /// Normalized aliases for a sheet, canonical name first
    pub(crate) fn sheet_names(&self, sheet: LogicalSheet) -> &[String] {
        &self.sheets[&sheet]
    }

    /// Normalized aliases for a field, canonical name first
    pub(crate) fn field_names(&self, field: Field) -> &[String] {
        &self.fields[&field]
    }
}

pub(crate) static ALIAS_TABLE: Lazy<AliasTable> = Lazy::new(|| {
    let mut sheets = HashMap::new();
    for sheet in LogicalSheet::ALL {
        let mut names = vec![norm(sheet.canonical())];
        names.extend(sheet.aliases().iter().map(|a| norm(a)));
        sheets.insert(sheet, names);
    }

    let mut fields = HashMap::new();
    for field in [
        Field::Date,
        Field::Product,
        Field::Qty,
        Field::Peer,
        Field::StockLevel,
        Field::Setting,
        Field::Value,
    ] {
        let mut names = vec![norm(field.canonical())];
        names.extend(field.aliases().iter().map(|a| norm(a)));
        fields.insert(field, names);
    }

    AliasTable { sheets, fields }
});
